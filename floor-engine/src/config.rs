use floor_client::ClientConfig;

use crate::occupancy::OccupancyScope;

/// 前台引擎配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | FLOOR_SERVER_URL | (none) | 后端地址，未设置时使用内存后端 |
/// | FLOOR_STAFF_ID | (none) | 当前服务员 ID |
/// | FLOOR_STAFF_SCOPED | false | 占用状态只统计当前服务员的订单 |
/// | FLOOR_DEFAULT_TAX_RATE | 0 | 新订单默认税率 (%) |
/// | FLOOR_REQUEST_TIMEOUT_SECS | 30 | 请求超时(秒) |
/// | FLOOR_LOG_LEVEL | info | 日志级别 |
/// | FLOOR_LOG_JSON | false | JSON 格式日志 |
/// | FLOOR_LOG_DIR | (none) | 日志目录，未设置时只输出到控制台 |
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_url: Option<String>,
    pub staff_id: Option<String>,
    pub staff_scoped: bool,
    pub default_tax_rate: f64,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl EngineConfig {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            server_url: std::env::var("FLOOR_SERVER_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            staff_id: std::env::var("FLOOR_STAFF_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            staff_scoped: std::env::var("FLOOR_STAFF_SCOPED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            default_tax_rate: std::env::var("FLOOR_DEFAULT_TAX_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|r: &f64| r.is_finite() && *r >= 0.0)
                .unwrap_or(0.0),
            request_timeout_secs: std::env::var("FLOOR_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            log_level: std::env::var("FLOOR_LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("FLOOR_LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("FLOOR_LOG_DIR").ok(),
        }
    }

    /// 占用统计范围
    pub fn occupancy_scope(&self) -> OccupancyScope {
        match (&self.staff_id, self.staff_scoped) {
            (Some(id), true) => OccupancyScope::Staff(id.clone()),
            _ => OccupancyScope::All,
        }
    }

    /// HTTP 客户端配置；未配置后端地址时返回 None
    pub fn client_config(&self) -> Option<ClientConfig> {
        self.server_url
            .as_ref()
            .map(|url| ClientConfig::new(url.clone()).with_timeout(self.request_timeout_secs))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            staff_id: None,
            staff_scoped: false,
            default_tax_rate: 0.0,
            request_timeout_secs: 30,
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_requires_staff_and_flag() {
        let mut config = EngineConfig::default();
        assert_eq!(config.occupancy_scope(), OccupancyScope::All);
        config.staff_id = Some("ana".into());
        assert_eq!(config.occupancy_scope(), OccupancyScope::All);
        config.staff_scoped = true;
        assert_eq!(config.occupancy_scope(), OccupancyScope::Staff("ana".into()));
    }

    #[test]
    fn test_client_config_uses_timeout() {
        let config = EngineConfig {
            server_url: Some("http://pos.local".into()),
            request_timeout_secs: 5,
            ..Default::default()
        };
        let client = config.client_config().unwrap();
        assert_eq!(client.timeout, 5);
        assert!(EngineConfig::default().client_config().is_none());
    }
}
