//! 桌台地图事件
//!
//! 渲染器（外部协作方）发回给 floor engine 的交互事件。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 右键菜单动作，按桌号触发
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextAction {
    MergeTables,
    MergeOrders,
    MoveOrderTable,
    LinkTables,
    UnlinkTable,
}

impl fmt::Display for ContextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextAction::MergeTables => "merge-tables",
            ContextAction::MergeOrders => "merge-orders",
            ContextAction::MoveOrderTable => "move-order-table",
            ContextAction::LinkTables => "link-tables",
            ContextAction::UnlinkTable => "unlink-table",
        };
        f.write_str(name)
    }
}

/// 渲染器事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FloorEvent {
    /// 点击桌台
    TableTap { id: String, number: String },
    /// 拖动结束后的新位置
    TableMove { id: String, x: f64, y: f64 },
    /// 旋转增量（度）
    TableRotate { id: String, delta: f64 },
    /// 右键菜单
    ContextAction {
        action: ContextAction,
        table_number: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_action_names() {
        let json = serde_json::to_string(&ContextAction::MoveOrderTable).unwrap();
        assert_eq!(json, "\"move-order-table\"");
        assert_eq!(ContextAction::UnlinkTable.to_string(), "unlink-table");
    }

    #[test]
    fn test_event_tagged_by_type() {
        let event: FloorEvent = serde_json::from_value(serde_json::json!({
            "type": "context_action",
            "action": "merge-orders",
            "table_number": "3"
        }))
        .unwrap();
        assert_eq!(
            event,
            FloorEvent::ContextAction {
                action: ContextAction::MergeOrders,
                table_number: "3".into(),
            }
        );
    }
}
