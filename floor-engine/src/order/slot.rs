//! Current order of a terminal
//!
//! Mutations on an empty slot are no-ops and return `None`; callers check
//! for an active order first when they need to report one.

use shared::{Discount, ModifierSelection, Order};

use super::aggregate::{self, NewItem};

#[derive(Debug, Clone, Default)]
pub struct OrderSlot(Option<Order>);

impl OrderSlot {
    pub fn new() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&Order> {
        self.0.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|o| o.id.as_str())
    }

    pub fn replace(&mut self, order: Order) -> Option<Order> {
        self.0.replace(order)
    }

    pub fn take(&mut self) -> Option<Order> {
        self.0.take()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    fn update<R>(&mut self, f: impl FnOnce(Order) -> (Order, R)) -> Option<R> {
        let order = self.0.take()?;
        let (next, out) = f(order);
        self.0 = Some(next);
        Some(out)
    }

    fn map(&mut self, f: impl FnOnce(Order) -> Order) -> Option<&Order> {
        self.update(|o| (f(o), ()))?;
        self.0.as_ref()
    }

    /// Returns the new item's id
    pub fn add_item(&mut self, item: NewItem) -> Option<String> {
        self.update(|o| aggregate::add_item(o, item))
    }

    pub fn remove_item(&mut self, item_id: &str) -> Option<&Order> {
        self.map(|o| aggregate::remove_item(o, item_id))
    }

    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) -> Option<&Order> {
        self.map(|o| aggregate::set_quantity(o, item_id, quantity))
    }

    pub fn add_modifier(&mut self, item_id: &str, modifier: ModifierSelection) -> Option<&Order> {
        self.map(|o| aggregate::add_modifier(o, item_id, modifier))
    }

    pub fn set_note(&mut self, item_id: &str, note: &str) -> Option<&Order> {
        self.map(|o| aggregate::set_note(o, item_id, note))
    }

    pub fn apply_discount(&mut self, discount: Option<Discount>) -> Option<&Order> {
        self.map(|o| aggregate::apply_discount(o, discount))
    }

    /// Percent, applied to the pre-discount subtotal
    pub fn set_tax_rate(&mut self, tax_rate: f64) -> Option<&Order> {
        self.map(|o| aggregate::set_tax_rate(o, tax_rate))
    }

    pub fn set_tip(&mut self, tip: f64) -> Option<&Order> {
        self.map(|o| aggregate::set_tip(o, tip))
    }

    pub fn set_current_client(&mut self, client: u32) -> Option<&Order> {
        self.map(|o| aggregate::set_current_client(o, client))
    }
}
