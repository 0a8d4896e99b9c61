//! Table occupancy index
//!
//! A pure projection of the active order list: which table numbers (and
//! composite bindings) currently hold a non-paid order. It is rebuilt after
//! every refresh and never stored.

use std::collections::HashSet;

use shared::{DiningTable, Order, TableBinding};

/// Whose orders count
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OccupancyScope {
    #[default]
    All,
    /// Only orders opened by this staff member
    Staff(String),
}

impl OccupancyScope {
    pub fn includes(&self, order: &Order) -> bool {
        match self {
            OccupancyScope::All => true,
            OccupancyScope::Staff(id) => order.employee_id.as_deref() == Some(id.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyIndex {
    numbers: HashSet<String>,
}

impl OccupancyIndex {
    /// Composite bindings contribute every member number plus the composite
    /// key itself (`"3-4-5"` -> `3`, `4`, `5`, `3-4-5`).
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>, scope: &OccupancyScope) -> Self {
        let mut numbers = HashSet::new();
        for order in orders {
            if !order.is_active() || !scope.includes(order) {
                continue;
            }
            match &order.table_number {
                TableBinding::Takeout => {}
                TableBinding::Single(n) => {
                    numbers.insert(n.clone());
                }
                TableBinding::Composite(members) => {
                    numbers.extend(members.iter().cloned());
                    numbers.insert(order.table_number.key());
                }
            }
        }
        Self { numbers }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.numbers.contains(key)
    }

    /// Occupied if the table's own number or any binding covering it is held
    pub fn is_occupied(&self, number: &str) -> bool {
        self.numbers.contains(number)
    }

    pub fn is_binding_occupied(&self, binding: &TableBinding) -> bool {
        match binding {
            TableBinding::Takeout => false,
            _ => {
                self.numbers.contains(&binding.key())
                    || binding.members().iter().any(|m| self.numbers.contains(*m))
            }
        }
    }

    pub fn numbers(&self) -> &HashSet<String> {
        &self.numbers
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

/// The set of table numbers bound to a live order, over all staff
pub fn active_table_numbers<'a>(orders: impl IntoIterator<Item = &'a Order>) -> HashSet<String> {
    OccupancyIndex::from_orders(orders, &OccupancyScope::All).numbers
}

/// Active order whose binding covers `number`
pub fn find_order_for_table<'a>(orders: &'a [Order], number: &str) -> Option<&'a Order> {
    orders
        .iter()
        .find(|o| o.is_active() && o.table_number.contains(number))
}

/// Why a table was tapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapPurpose {
    /// Open or resume an order
    Open,
    /// Pick a target for a move or merge; must be free
    FreeTarget,
    /// Pick a table that must already have an order
    OccupiedTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TapDecision {
    /// Free table: ask for a client count up to `capacity`
    StartNew { number: String, capacity: u32 },
    /// Table has an order of ours
    Resume { order_id: String },
    /// Target accepted
    Accept { number: String },
    /// Table already has an order (not resumable from here)
    AlreadyOccupied { number: String },
    /// Target must have an order but has none
    NoOrder { number: String },
}

/// Decide what a tap on `table` means
pub fn decide_tap(
    orders: &[Order],
    index: &OccupancyIndex,
    table: &DiningTable,
    purpose: TapPurpose,
) -> TapDecision {
    let number = table.number.clone();
    let occupied = index.is_occupied(&table.number);
    match purpose {
        TapPurpose::Open => match find_order_for_table(orders, &table.number) {
            Some(order) if occupied => TapDecision::Resume {
                order_id: order.id.clone(),
            },
            _ if occupied => TapDecision::AlreadyOccupied { number },
            _ => TapDecision::StartNew {
                number,
                capacity: table.capacity,
            },
        },
        TapPurpose::FreeTarget if occupied => TapDecision::AlreadyOccupied { number },
        TapPurpose::FreeTarget => TapDecision::Accept { number },
        TapPurpose::OccupiedTarget if occupied => TapDecision::Accept { number },
        TapPurpose::OccupiedTarget => TapDecision::NoOrder { number },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{OrderStatus, TableGeometry, TableStatus};

    fn order(id: &str, binding: &str, status: OrderStatus, employee: Option<&str>) -> Order {
        Order {
            id: id.into(),
            table_number: binding.into(),
            items: vec![],
            status,
            merged_from: vec![],
            client_count: 1,
            current_client: 1,
            discount: None,
            tax_rate: 0.0,
            tip: 0.0,
            subtotal: 0.0,
            total: 0.0,
            employee_id: employee.map(Into::into),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn table(number: &str, capacity: u32) -> DiningTable {
        DiningTable {
            id: format!("t-{}", number),
            number: number.into(),
            capacity,
            status: TableStatus::Available,
            geometry: TableGeometry::default(),
            group_id: None,
            color: None,
        }
    }

    #[test]
    fn test_composite_expands_members_and_key() {
        let orders = vec![order("o1", "3-4-5", OrderStatus::Sent, None)];
        let set = active_table_numbers(&orders);
        for key in ["3", "4", "5", "3-4-5"] {
            assert!(set.contains(key), "missing {}", key);
        }
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_paid_orders_do_not_occupy() {
        let orders = vec![
            order("o1", "1", OrderStatus::Paid, None),
            order("o2", "2", OrderStatus::Completed, None),
            order("o3", "", OrderStatus::New, None),
        ];
        let set = active_table_numbers(&orders);
        assert!(!set.contains("1"));
        assert!(set.contains("2"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_staff_scope() {
        let orders = vec![
            order("o1", "1", OrderStatus::Hold, Some("ana")),
            order("o2", "2", OrderStatus::Hold, Some("ben")),
        ];
        let index = OccupancyIndex::from_orders(&orders, &OccupancyScope::Staff("ana".into()));
        assert!(index.is_occupied("1"));
        assert!(!index.is_occupied("2"));
    }

    #[test]
    fn test_binding_occupied_by_member() {
        let orders = vec![order("o1", "4", OrderStatus::Sent, None)];
        let index = OccupancyIndex::from_orders(&orders, &OccupancyScope::All);
        assert!(index.is_binding_occupied(&TableBinding::parse("4-10")));
        assert!(!index.is_binding_occupied(&TableBinding::parse("5-10")));
        assert!(!index.is_binding_occupied(&TableBinding::Takeout));
    }

    #[test]
    fn test_decide_tap() {
        let orders = vec![order("o1", "3-4", OrderStatus::Sent, None)];
        let index = OccupancyIndex::from_orders(&orders, &OccupancyScope::All);

        assert_eq!(
            decide_tap(&orders, &index, &table("4", 2), TapPurpose::Open),
            TapDecision::Resume { order_id: "o1".into() }
        );
        assert_eq!(
            decide_tap(&orders, &index, &table("6", 4), TapPurpose::Open),
            TapDecision::StartNew { number: "6".into(), capacity: 4 }
        );
        assert_eq!(
            decide_tap(&orders, &index, &table("3", 2), TapPurpose::FreeTarget),
            TapDecision::AlreadyOccupied { number: "3".into() }
        );
        assert_eq!(
            decide_tap(&orders, &index, &table("6", 4), TapPurpose::OccupiedTarget),
            TapDecision::NoOrder { number: "6".into() }
        );
    }

    #[test]
    fn test_other_staff_order_blocks_open() {
        let orders = vec![order("o1", "2", OrderStatus::Hold, Some("ben"))];
        let all = OccupancyIndex::from_orders(&orders, &OccupancyScope::All);
        // the order list handed in is already scoped to the acting staff
        let visible: Vec<Order> = vec![];
        assert_eq!(
            decide_tap(&visible, &all, &table("2", 4), TapPurpose::Open),
            TapDecision::AlreadyOccupied { number: "2".into() }
        );
    }
}
