use std::cmp::Ordering;

/// Prefix carried by every client-generated identifier until the backend
/// assigns a durable one.
pub const TEMP_ID_PREFIX: &str = "tmp-";

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a temporary identifier for an order or item that only exists locally.
pub fn temp_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, uuid::Uuid::new_v4())
}

/// Whether an identifier was generated locally and never persisted.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Natural ordering for table numbers: `"4"` < `"10"`.
///
/// Purely numeric strings compare by value; anything else falls back to
/// length-then-lexicographic so `"A2"` < `"A10"` as well.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_cmp_numeric() {
        assert_eq!(natural_cmp("4", "10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "4"), Ordering::Greater);
        assert_eq!(natural_cmp("7", "7"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_mixed() {
        assert_eq!(natural_cmp("9", "A1"), Ordering::Less);
        assert_eq!(natural_cmp("A2", "A10"), Ordering::Less);
    }

    #[test]
    fn test_temp_id() {
        let id = temp_id();
        assert!(is_temp_id(&id));
        assert!(!is_temp_id("order-42"));
        assert_ne!(temp_id(), id);
    }
}
