//! Pure order mutations
//!
//! Every function consumes a snapshot and returns the next one. Totals are
//! recomputed before returning, so a stale subtotal is never observable.
//! Unknown item ids leave the order unchanged.

use shared::util::{now_millis, temp_id};
use shared::{Discount, MenuItemSnapshot, ModifierSelection, Order, OrderItem, OrderStatus, TableBinding};

use crate::money;

/// Item to add to an order
#[derive(Debug, Clone)]
pub struct NewItem {
    pub menu_item: MenuItemSnapshot,
    pub quantity: u32,
    pub modifiers: Vec<ModifierSelection>,
    pub note: Option<String>,
}

impl NewItem {
    pub fn new(menu_item: MenuItemSnapshot, quantity: u32) -> Self {
        Self {
            menu_item,
            quantity,
            modifiers: Vec::new(),
            note: None,
        }
    }

    pub fn with_modifier(mut self, modifier: ModifierSelection) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// New local draft with a temporary id
pub fn create_order(
    table: TableBinding,
    client_count: u32,
    tax_rate: f64,
    employee_id: Option<String>,
) -> Order {
    let now = now_millis();
    money::recompute(Order {
        id: temp_id(),
        table_number: table,
        items: Vec::new(),
        status: OrderStatus::New,
        merged_from: Vec::new(),
        client_count: client_count.max(1),
        current_client: 1,
        discount: None,
        tax_rate,
        tip: 0.0,
        subtotal: 0.0,
        total: 0.0,
        employee_id,
        created_at: now,
        updated_at: now,
    })
}

fn settle(mut order: Order) -> Order {
    order.updated_at = now_millis();
    money::recompute(order)
}

/// Add an item for the current client. Returns the new item's id.
pub fn add_item(mut order: Order, item: NewItem) -> (Order, String) {
    let id = temp_id();
    let price = money::unit_price(item.menu_item.price, &item.modifiers);
    order.items.push(OrderItem {
        id: id.clone(),
        menu_item: item.menu_item,
        quantity: item.quantity.max(1),
        modifiers: item.modifiers,
        note: item.note,
        price,
        client_number: order.current_client,
        source_table: None,
    });
    (settle(order), id)
}

pub fn remove_item(mut order: Order, item_id: &str) -> Order {
    let before = order.items.len();
    order.items.retain(|i| i.id != item_id);
    if order.items.len() == before {
        return order;
    }
    settle(order)
}

/// Quantity 0 removes the item
pub fn set_quantity(mut order: Order, item_id: &str, quantity: u32) -> Order {
    if quantity == 0 {
        return remove_item(order, item_id);
    }
    match order.item_mut(item_id) {
        Some(item) => item.quantity = quantity,
        None => return order,
    }
    settle(order)
}

/// Select options of one modifier group, replacing an earlier selection of
/// the same group. The unit price follows.
pub fn add_modifier(mut order: Order, item_id: &str, modifier: ModifierSelection) -> Order {
    let Some(item) = order.item_mut(item_id) else {
        return order;
    };
    match item.modifiers.iter_mut().find(|m| m.group_id == modifier.group_id) {
        Some(existing) => *existing = modifier,
        None => item.modifiers.push(modifier),
    }
    item.price = money::unit_price(item.menu_item.price, &item.modifiers);
    settle(order)
}

/// Empty note clears it
pub fn set_note(mut order: Order, item_id: &str, note: &str) -> Order {
    let Some(item) = order.item_mut(item_id) else {
        return order;
    };
    let note = note.trim();
    item.note = (!note.is_empty()).then(|| note.to_string());
    order.updated_at = now_millis();
    order
}

/// `None` removes the discount
pub fn apply_discount(mut order: Order, discount: Option<Discount>) -> Order {
    order.discount = discount;
    settle(order)
}

pub fn set_tax_rate(mut order: Order, tax_rate: f64) -> Order {
    order.tax_rate = tax_rate;
    settle(order)
}

pub fn set_tip(mut order: Order, tip: f64) -> Order {
    order.tip = tip.max(0.0);
    order.updated_at = now_millis();
    order
}

/// Move the client cursor. Out-of-range values are ignored.
pub fn set_current_client(mut order: Order, client: u32) -> Order {
    if (1..=order.client_count).contains(&client) {
        order.current_client = client;
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ModifierOption;

    fn dish(price: f64) -> MenuItemSnapshot {
        MenuItemSnapshot::new(format!("m-{}", price), "Dish", price)
    }

    fn size(option: &str, price: f64) -> ModifierSelection {
        ModifierSelection {
            group_id: "size".into(),
            group_name: "Size".into(),
            options: vec![ModifierOption {
                id: option.into(),
                name: option.into(),
                price,
            }],
        }
    }

    fn assert_settled(order: &Order) {
        let expected: f64 = order.items.iter().map(|i| i.price * i.quantity as f64).sum();
        assert!((order.subtotal - expected).abs() < 1e-9);
    }

    #[test]
    fn test_create_order_is_temporary() {
        let order = create_order(TableBinding::single("7"), 2, 0.0, None);
        assert!(order.is_temporary());
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.current_client, 1);
        assert_eq!(order.client_count, 2);
    }

    #[test]
    fn test_add_item_assigns_current_client() {
        let order = create_order(TableBinding::single("7"), 2, 0.0, None);
        let order = set_current_client(order, 2);
        let (order, id) = add_item(order, NewItem::new(dish(5.0), 1));
        let item = order.item(&id).unwrap();
        assert_eq!(item.client_number, 2);
        assert!(item.is_temporary());
        assert_eq!(order.subtotal, 5.0);
    }

    #[test]
    fn test_every_mutation_recomputes() {
        let order = create_order(TableBinding::Takeout, 1, 10.0, None);
        let (order, a) = add_item(order, NewItem::new(dish(10.0), 2));
        assert_settled(&order);
        let (order, b) = add_item(order, NewItem::new(dish(4.0), 1));
        assert_settled(&order);
        let order = set_quantity(order, &a, 3);
        assert_settled(&order);
        assert_eq!(order.subtotal, 34.0);
        let order = add_modifier(order, &b, size("large", 1.0));
        assert_settled(&order);
        assert_eq!(order.subtotal, 35.0);
        let order = remove_item(order, &a);
        assert_settled(&order);
        assert_eq!(order.subtotal, 5.0);
        assert_eq!(order.total, 5.5);
    }

    #[test]
    fn test_modifier_replaces_same_group() {
        let order = create_order(TableBinding::Takeout, 1, 0.0, None);
        let (order, id) = add_item(order, NewItem::new(dish(3.0), 1));
        let order = add_modifier(order, &id, size("large", 1.5));
        let order = add_modifier(order, &id, size("small", 0.0));
        let item = order.item(&id).unwrap();
        assert_eq!(item.modifiers.len(), 1);
        assert_eq!(item.price, 3.0);
    }

    #[test]
    fn test_quantity_zero_removes() {
        let order = create_order(TableBinding::Takeout, 1, 0.0, None);
        let (order, id) = add_item(order, NewItem::new(dish(3.0), 2));
        let order = set_quantity(order, &id, 0);
        assert!(order.items.is_empty());
        assert_eq!(order.subtotal, 0.0);
        assert_eq!(order.total, 0.0);
    }

    #[test]
    fn test_discount_then_tax_on_subtotal() {
        let order = create_order(TableBinding::single("1"), 1, 8.0, None);
        let (order, _) = add_item(order, NewItem::new(dish(100.0), 1));
        let order = apply_discount(order, Some(Discount::percentage(10.0)));
        assert_eq!(order.subtotal, 100.0);
        assert_eq!(order.total, 98.0);
        let order = apply_discount(order, None);
        assert_eq!(order.total, 108.0);
    }

    #[test]
    fn test_set_current_client_out_of_range_ignored() {
        let order = create_order(TableBinding::single("7"), 2, 0.0, None);
        let order = set_current_client(order, 3);
        assert_eq!(order.current_client, 1);
        let order = set_current_client(order, 0);
        assert_eq!(order.current_client, 1);
    }

    #[test]
    fn test_note_and_unknown_item() {
        let order = create_order(TableBinding::Takeout, 1, 0.0, None);
        let (order, id) = add_item(order, NewItem::new(dish(3.0), 1));
        let order = set_note(order, &id, "  no onions ");
        assert_eq!(order.item(&id).unwrap().note.as_deref(), Some("no onions"));
        let order = set_note(order, &id, "");
        assert!(order.item(&id).unwrap().note.is_none());

        let before = order.clone();
        let order = set_quantity(order, "missing", 4);
        assert_eq!(order, before);
    }

    #[test]
    fn test_tip_not_in_total() {
        let order = create_order(TableBinding::Takeout, 1, 0.0, None);
        let (order, _) = add_item(order, NewItem::new(dish(20.0), 1));
        let order = set_tip(order, 2.0);
        assert_eq!(order.tip, 2.0);
        assert_eq!(order.total, 20.0);
    }
}
