//! In-memory floor backend
//!
//! Implements [`FloorBackend`] with the backend's semantics (occupancy
//! checks, order merge, link validation) over process memory. Used by the
//! demo binary when no server is configured, and by tests, which can also
//! inject failures and count calls.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use floor_client::{ClientError, ClientResult, FloorBackend, LinkedPayment, LinkedPaymentEntry};
use parking_lot::Mutex;
use shared::models::{LinkCreate, LinkRemove};
use shared::util::{is_temp_id, now_millis};
use shared::{
    DiningTable, DiningTableUpdate, ErrorCode, LinkGroup, Order, OrderItem, OrderStatus,
    TableBinding,
};

use crate::merge::fold_order;
use crate::money;
use crate::occupancy::{OccupancyIndex, OccupancyScope, find_order_for_table};

#[derive(Debug, Default)]
struct MemoryState {
    tables: Vec<DiningTable>,
    orders: Vec<Order>,
    links: Vec<LinkGroup>,
    next_id: u64,
    /// Fail this many upcoming calls
    fail_next: u32,
    /// Fail the next call of these operations
    failing: HashSet<&'static str>,
    /// Orders whose payment is declined
    declined: HashSet<String>,
    calls: HashMap<&'static str, usize>,
}

impl MemoryState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn order_mut(&mut self, id: &str) -> ClientResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| order_not_found(id))
    }

    fn table_by_number_mut(&mut self, number: &str) -> ClientResult<&mut DiningTable> {
        self.tables
            .iter_mut()
            .find(|t| t.number == number)
            .ok_or_else(|| table_not_found(number))
    }

    /// Reject a binding already held by another active order
    fn ensure_free(&self, binding: &TableBinding, except_order: Option<&str>) -> ClientResult<()> {
        let others = self
            .orders
            .iter()
            .filter(|o| Some(o.id.as_str()) != except_order);
        let index = OccupancyIndex::from_orders(others, &OccupancyScope::All);
        if index.is_binding_occupied(binding) {
            return Err(ClientError::api(
                ErrorCode::TableOccupied,
                format!("Table {} already has an order", binding),
            ));
        }
        Ok(())
    }

    fn assign_item_ids(&mut self, order: &mut Order) {
        for item in order.items.iter_mut() {
            if is_temp_id(&item.id) {
                item.id = self.next_id("item");
            }
        }
    }

    fn group_of(&self, table: &str) -> Option<usize> {
        self.links.iter().position(|g| g.contains(table))
    }

    fn set_group(&mut self, numbers: &[String], group_id: Option<&str>) {
        for table in self.tables.iter_mut() {
            if numbers.contains(&table.number) {
                table.group_id = group_id.map(str::to_string);
            }
        }
    }
}

fn order_not_found(id: &str) -> ClientError {
    ClientError::api(ErrorCode::OrderNotFound, format!("Order {} not found", id))
}

fn table_not_found(id: &str) -> ClientError {
    ClientError::api(ErrorCode::TableNotFound, format!("Table {} not found", id))
}

fn ensure_open(order: &Order) -> ClientResult<()> {
    if order.status.is_paid() {
        return Err(ClientError::api(
            ErrorCode::OrderAlreadyPaid,
            format!("Order {} is already paid", order.id),
        ));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(tables: Vec<DiningTable>) -> Self {
        let backend = Self::new();
        backend.state.lock().tables = tables;
        backend
    }

    /// Make the next `n` calls fail with a transport-like error
    pub fn fail_next(&self, n: u32) {
        self.state.lock().fail_next = n;
    }

    /// Make the next call of one operation fail
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().failing.insert(operation);
    }

    /// Decline payment of this order in linked payments
    pub fn decline_payment(&self, order_id: impl Into<String>) {
        self.state.lock().declined.insert(order_id.into());
    }

    /// How many times an operation was called (failed calls included)
    pub fn calls(&self, operation: &str) -> usize {
        self.state.lock().calls.get(operation).copied().unwrap_or(0)
    }

    /// Every stored order, paid ones included
    pub fn all_orders(&self) -> Vec<Order> {
        self.state.lock().orders.clone()
    }

    pub fn links(&self) -> Vec<LinkGroup> {
        self.state.lock().links.clone()
    }

    /// Count the call, then honour pending injected failures
    fn enter(&self, operation: &'static str) -> ClientResult<parking_lot::MutexGuard<'_, MemoryState>> {
        let mut state = self.state.lock();
        *state.calls.entry(operation).or_default() += 1;
        let injected = if state.failing.remove(operation) {
            true
        } else if state.fail_next > 0 {
            state.fail_next -= 1;
            true
        } else {
            false
        };
        if injected {
            tracing::debug!(operation, "Injected backend failure");
            return Err(ClientError::Internal(format!("injected failure in {}", operation)));
        }
        Ok(state)
    }
}

#[async_trait]
impl FloorBackend for MemoryBackend {
    // ========== Tables ==========

    async fn list_tables(&self) -> ClientResult<Vec<DiningTable>> {
        Ok(self.enter("list_tables")?.tables.clone())
    }

    async fn get_table(&self, id: &str) -> ClientResult<DiningTable> {
        self.enter("get_table")?
            .tables
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| table_not_found(id))
    }

    async fn create_table(&self, table: &DiningTable) -> ClientResult<DiningTable> {
        let mut state = self.enter("create_table")?;
        if state.tables.iter().any(|t| t.number == table.number) {
            return Err(ClientError::Validation(format!(
                "Table number {} already exists",
                table.number
            )));
        }
        let mut created = table.clone();
        if created.id.is_empty() || is_temp_id(&created.id) {
            created.id = state.next_id("table");
        }
        state.tables.push(created.clone());
        Ok(created)
    }

    async fn update_table(&self, id: &str, update: &DiningTableUpdate) -> ClientResult<DiningTable> {
        let mut state = self.enter("update_table")?;
        let table = state
            .tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| table_not_found(id))?;
        update.apply_to(table);
        Ok(table.clone())
    }

    async fn delete_table(&self, id: &str) -> ClientResult<()> {
        let mut state = self.enter("delete_table")?;
        let before = state.tables.len();
        state.tables.retain(|t| t.id != id);
        if state.tables.len() == before {
            return Err(table_not_found(id));
        }
        Ok(())
    }

    // ========== Orders ==========

    /// Open orders only; paid orders leave the list
    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let state = self.enter("list_orders")?;
        Ok(state.orders.iter().filter(|o| o.is_active()).cloned().collect())
    }

    async fn get_order(&self, id: &str) -> ClientResult<Order> {
        let state = self.enter("get_order")?;
        state
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| order_not_found(id))
    }

    async fn create_order(&self, order: &Order) -> ClientResult<Order> {
        let mut state = self.enter("create_order")?;
        state.ensure_free(&order.table_number, None)?;
        let mut created = order.clone();
        created.id = state.next_id("order");
        state.assign_item_ids(&mut created);
        let now = now_millis();
        created.created_at = now;
        created.updated_at = now;
        let created = money::recompute(created);
        tracing::debug!(order_id = %created.id, table = %created.table_number, "Order created");
        state.orders.push(created.clone());
        Ok(created)
    }

    async fn update_order(&self, order: &Order) -> ClientResult<Order> {
        let mut state = self.enter("update_order")?;
        let mut incoming = order.clone();
        state.assign_item_ids(&mut incoming);
        let stored = state.order_mut(&order.id)?;
        ensure_open(stored)?;
        let table_number = stored.table_number.clone();
        let merged_from = stored.merged_from.clone();
        let created_at = stored.created_at;
        *stored = money::recompute(Order {
            table_number,
            merged_from,
            created_at,
            updated_at: now_millis(),
            ..incoming
        });
        Ok(stored.clone())
    }

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> ClientResult<Order> {
        let mut state = self.enter("update_order_status")?;
        let order = state.order_mut(id)?;
        ensure_open(order)?;
        order.status = status;
        order.updated_at = now_millis();
        Ok(order.clone())
    }

    async fn merge_orders(&self, source_id: &str, target_id: &str) -> ClientResult<Order> {
        let mut state = self.enter("merge_orders")?;
        if source_id == target_id {
            return Err(ClientError::api(
                ErrorCode::MergeSameOrder,
                "Cannot merge order into itself",
            ));
        }
        let source = state.order_mut(source_id)?.clone();
        ensure_open(&source)?;
        let target = state.order_mut(target_id)?.clone();
        ensure_open(&target)?;

        let merged = fold_order(&source, target);
        state.orders.retain(|o| o.id != source_id);
        *state.order_mut(target_id)? = merged.clone();
        tracing::debug!(source_id, target_id, "Orders merged");
        Ok(merged)
    }

    async fn change_table(&self, order_id: &str, table: &TableBinding) -> ClientResult<Order> {
        let mut state = self.enter("change_table")?;
        state.ensure_free(table, Some(order_id))?;
        let order = state.order_mut(order_id)?;
        ensure_open(order)?;
        order.table_number = table.clone();
        order.updated_at = now_millis();
        Ok(order.clone())
    }

    // ========== Order items ==========

    async fn list_items(&self, order_id: &str) -> ClientResult<Vec<OrderItem>> {
        let mut state = self.enter("list_items")?;
        Ok(state.order_mut(order_id)?.items.clone())
    }

    async fn create_item(&self, order_id: &str, item: &OrderItem) -> ClientResult<OrderItem> {
        let mut state = self.enter("create_item")?;
        let id = state.next_id("item");
        let order = state.order_mut(order_id)?;
        ensure_open(order)?;
        let mut created = item.clone();
        created.id = id;
        order.items.push(created.clone());
        *order = money::recompute(order.clone());
        Ok(created)
    }

    // ========== Table links ==========

    async fn create_link(&self, link: &LinkCreate) -> ClientResult<LinkGroup> {
        let mut state = self.enter("create_link")?;
        let numbers: Vec<String> = std::iter::once(link.leader.clone())
            .chain(link.members.iter().cloned())
            .collect();
        for number in &numbers {
            let table = state.table_by_number_mut(number)?;
            if let Some(group_id) = &table.group_id {
                return Err(ClientError::Api(
                    shared::AppError::with_message(
                        ErrorCode::TableAlreadyLinked,
                        format!("Table {} is already linked", number),
                    )
                    .with_detail("group_id", group_id.clone()),
                ));
            }
        }
        if find_order_for_table(&state.orders, &link.leader).is_none() {
            return Err(ClientError::api(
                ErrorCode::LinkLeaderWithoutOrder,
                format!("Leader table {} has no active order", link.leader),
            ));
        }

        let group_id = state.next_id("group");
        let group = LinkGroup::new(group_id.clone(), link.leader.clone(), &link.members);
        state.set_group(&group.members, Some(group_id.as_str()));
        state.links.push(group.clone());
        tracing::debug!(group_id = %group_id, leader = %link.leader, "Tables linked");
        Ok(group)
    }

    async fn get_link(&self, table_number: &str) -> ClientResult<Option<LinkGroup>> {
        let state = self.enter("get_link")?;
        Ok(state.group_of(table_number).map(|i| state.links[i].clone()))
    }

    async fn pay_linked(&self, table_number: &str) -> ClientResult<LinkedPayment> {
        let mut state = self.enter("pay_linked")?;
        let Some(idx) = state.group_of(table_number) else {
            return Err(ClientError::api(
                ErrorCode::TableNotLinked,
                format!("Table {} is not linked", table_number),
            ));
        };
        let group = state.links[idx].clone();

        let mut entries = Vec::with_capacity(group.members.len());
        for number in &group.members {
            let order_id = find_order_for_table(&state.orders, number).map(|o| o.id.clone());
            let mut entry = LinkedPaymentEntry {
                table_number: number.clone(),
                order_id: order_id.clone(),
                paid: false,
                error: None,
            };
            if let Some(id) = order_id {
                if state.declined.contains(&id) {
                    entry.error = Some("payment declined".to_string());
                } else {
                    let order = state.order_mut(&id)?;
                    order.status = OrderStatus::Paid;
                    order.updated_at = now_millis();
                    entry.paid = true;
                }
            }
            entries.push(entry);
        }

        let payment = LinkedPayment {
            group_id: group.group_id.clone(),
            entries,
        };
        // a fully paid group has served its purpose
        if payment.is_complete() {
            state.set_group(&group.members, None);
            state.links.remove(idx);
        }
        Ok(payment)
    }

    async fn unlink(&self, unlink: &LinkRemove) -> ClientResult<Option<LinkGroup>> {
        let mut state = self.enter("unlink")?;
        let Some(idx) = state.group_of(&unlink.table) else {
            return Err(ClientError::api(
                ErrorCode::TableNotLinked,
                format!("Table {} is not linked", unlink.table),
            ));
        };

        if unlink.unlink_all {
            let group = state.links.remove(idx);
            state.set_group(&group.members, None);
            return Ok(None);
        }

        state.links[idx].remove(&unlink.table);
        state.set_group(std::slice::from_ref(&unlink.table), None);
        if state.links[idx].is_dissolved() {
            let group = state.links.remove(idx);
            state.set_group(&group.members, None);
            return Ok(None);
        }
        Ok(Some(state.links[idx].clone()))
    }
}
