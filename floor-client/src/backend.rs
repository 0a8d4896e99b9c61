//! Backend operations consumed by the floor engine
//!
//! The backend is authoritative: every call is a single round-trip, and the
//! engine converges by re-fetching lists after each mutation.

use async_trait::async_trait;
use shared::models::{LinkCreate, LinkRemove};
use shared::{
    DiningTable, DiningTableUpdate, LinkGroup, Order, OrderItem, OrderStatus, TableBinding,
};

use crate::{ClientResult, LinkedPayment};

#[async_trait]
pub trait FloorBackend: Send + Sync {
    // ========== Tables ==========

    async fn list_tables(&self) -> ClientResult<Vec<DiningTable>>;

    async fn get_table(&self, id: &str) -> ClientResult<DiningTable>;

    async fn create_table(&self, table: &DiningTable) -> ClientResult<DiningTable>;

    /// Partial update: status, position, rotation or color
    async fn update_table(&self, id: &str, update: &DiningTableUpdate) -> ClientResult<DiningTable>;

    async fn delete_table(&self, id: &str) -> ClientResult<()>;

    // ========== Orders ==========

    async fn list_orders(&self) -> ClientResult<Vec<Order>>;

    async fn get_order(&self, id: &str) -> ClientResult<Order>;

    /// Create an order; the returned order carries the server-assigned id
    async fn create_order(&self, order: &Order) -> ClientResult<Order>;

    /// Full-field update of an existing order
    async fn update_order(&self, order: &Order) -> ClientResult<Order>;

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> ClientResult<Order>;

    /// Fold `source_id` into `target_id`. Returns the target after the merge;
    /// the source order no longer exists afterwards.
    async fn merge_orders(&self, source_id: &str, target_id: &str) -> ClientResult<Order>;

    async fn change_table(&self, order_id: &str, table: &TableBinding) -> ClientResult<Order>;

    // ========== Order items ==========

    async fn list_items(&self, order_id: &str) -> ClientResult<Vec<OrderItem>>;

    /// Persist a new item; the returned item carries the server-assigned id
    async fn create_item(&self, order_id: &str, item: &OrderItem) -> ClientResult<OrderItem>;

    // ========== Table links ==========

    async fn create_link(&self, link: &LinkCreate) -> ClientResult<LinkGroup>;

    async fn get_link(&self, table_number: &str) -> ClientResult<Option<LinkGroup>>;

    /// Pay every member order of the group `table_number` belongs to
    async fn pay_linked(&self, table_number: &str) -> ClientResult<LinkedPayment>;

    /// Returns what is left of the group, `None` once it is dissolved
    async fn unlink(&self, unlink: &LinkRemove) -> ClientResult<Option<LinkGroup>>;
}
