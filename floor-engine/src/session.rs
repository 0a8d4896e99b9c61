//! Floor session: order lifecycle controller for one terminal
//!
//! Owns the terminal's view of the floor (tables, active orders, local
//! drafts), the current order, and the interaction mode driven by renderer
//! events. Every state-changing call is a single backend round-trip followed
//! by a refresh; there is no rollback beyond re-fetching.
//!
//! Lifecycle of an order:
//!
//! ```text
//! (tap free table) -> client-count prompt -> new (local, tmp- id)
//! new -> hold | sent | paid        persisted: create if temporary, else update
//! hold | sent -> sent | paid
//! persisted -> new                 resume_order reopens it for editing
//! new (temporary) -> discarded     cancel_order, never reaches the backend
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use floor_client::FloorBackend;
use shared::models::LinkRemove;
use shared::util::is_temp_id;
use shared::{
    ContextAction, DiningTable, DiningTableUpdate, FloorEvent, LinkGroup, Order, OrderItem, OrderStatus,
    TableBinding, TableStatus,
};

use crate::config::EngineConfig;
use crate::error::{FloorResult, Rejection};
use crate::link::{self, LinkedPaymentReport};
use crate::merge::{self, MergePlan, MergeSelection};
use crate::money;
use crate::occupancy::{
    OccupancyIndex, OccupancyScope, TapDecision, TapPurpose, decide_tap, find_order_for_table,
};
use crate::order::{OrderSlot, create_order};
use crate::view::{self, FloorSnapshot, TableView};

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Recorded on orders this terminal opens
    pub staff_id: Option<String>,
    pub scope: OccupancyScope,
    pub default_tax_rate: f64,
}

impl From<&EngineConfig> for SessionConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            staff_id: config.staff_id.clone(),
            scope: config.occupancy_scope(),
            default_tax_rate: config.default_tax_rate,
        }
    }
}

/// Pending "how many diners?" question before a new order exists
#[derive(Debug, Clone, PartialEq)]
pub struct ClientCountPrompt {
    pub binding: TableBinding,
    /// Table capacity, or the sum of member capacities for a merge
    pub capacity: u32,
}

/// What a table tap means right now. One mode at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Normal,
    MergeTables(MergeSelection),
    MergeOrders { source_table: String },
    MoveOrder { order_id: String },
    LinkTables { leader: String, members: Vec<String> },
}

/// Result of handling a renderer event
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Nothing,
    PromptClientCount(ClientCountPrompt),
    OrderOpened(Order),
    SelectionChanged,
    ModeChanged,
    OrdersMerged(Order),
    OrderMoved(Order),
    TableUpdated(DiningTable),
    Unlinked(Option<LinkGroup>),
}

/// Clears the sending flag when a persist round-trip ends, however it ends
struct SendingGuard(Arc<AtomicBool>);

impl SendingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for SendingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Rotation in degrees, normalised to [0, 360)
pub fn normalize_rotation(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    if r >= 360.0 { 0.0 } else { r }
}

pub struct FloorSession<B: FloorBackend> {
    backend: Arc<B>,
    config: SessionConfig,
    tables: Vec<DiningTable>,
    /// Persisted active orders, as last fetched
    orders: Vec<Order>,
    /// Parked local orders (never the current one)
    drafts: Vec<Order>,
    /// Lines added to a persisted order but not sent before switching away,
    /// keyed by order id
    unsent: HashMap<String, Vec<OrderItem>>,
    current: OrderSlot,
    prompt: Option<ClientCountPrompt>,
    mode: InteractionMode,
    sending: Arc<AtomicBool>,
}

impl<B: FloorBackend> FloorSession<B> {
    pub fn new(backend: Arc<B>, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            tables: Vec::new(),
            orders: Vec::new(),
            drafts: Vec::new(),
            unsent: HashMap::new(),
            current: OrderSlot::new(),
            prompt: None,
            mode: InteractionMode::Normal,
            sending: Arc::new(AtomicBool::new(false)),
        }
    }

    // ========== Accessors ==========

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn tables(&self) -> &[DiningTable] {
        &self.tables
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn drafts(&self) -> &[Order] {
        &self.drafts
    }

    /// Whether a persisted order has parked lines waiting to be sent
    pub fn has_unsent(&self, order_id: &str) -> bool {
        self.unsent.get(order_id).is_some_and(|items| !items.is_empty())
    }

    pub fn current(&self) -> Option<&Order> {
        self.current.get()
    }

    /// Edit the current order; every edit is a no-op when there is none
    pub fn current_order(&mut self) -> &mut OrderSlot {
        &mut self.current
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn prompt(&self) -> Option<&ClientCountPrompt> {
        self.prompt.as_ref()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Shared handle on the double-submit flag (e.g. to grey out a button)
    pub fn sending_flag(&self) -> Arc<AtomicBool> {
        self.sending.clone()
    }

    fn table_by_number(&self, number: &str) -> Result<&DiningTable, Rejection> {
        self.tables
            .iter()
            .find(|t| t.number == number)
            .ok_or_else(|| Rejection::TableNotFound(number.to_string()))
    }

    /// Drafts plus the current order while it is still local
    fn local_orders(&self) -> Vec<Order> {
        let mut local = self.drafts.clone();
        if let Some(order) = self.current.get()
            && order.is_temporary()
        {
            local.push(order.clone());
        }
        local
    }

    /// Occupancy over persisted orders and local drafts, in this terminal's scope
    pub fn occupancy(&self) -> OccupancyIndex {
        let local = self.local_orders();
        OccupancyIndex::from_orders(self.orders.iter().chain(local.iter()), &self.config.scope)
    }

    /// Occupancy over everything this terminal knows, regardless of scope
    fn occupancy_all(&self) -> OccupancyIndex {
        let local = self.local_orders();
        OccupancyIndex::from_orders(self.orders.iter().chain(local.iter()), &OccupancyScope::All)
    }

    /// Orders a tap may resume
    fn resumable_orders(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| self.config.scope.includes(o))
            .cloned()
            .chain(self.local_orders())
            .collect()
    }

    // ========== Refresh ==========

    /// Reload tables and orders from the backend
    pub async fn refresh(&mut self) -> FloorResult<()> {
        self.refresh_tables().await?;
        self.refresh_orders().await
    }

    pub async fn refresh_tables(&mut self) -> FloorResult<()> {
        self.tables = self.backend.list_tables().await?;
        Ok(())
    }

    pub async fn refresh_orders(&mut self) -> FloorResult<()> {
        let orders = self.backend.list_orders().await?;
        self.orders = orders.into_iter().filter(|o| o.is_active()).collect();
        let known = &self.orders;
        self.unsent.retain(|id, items| {
            let keep = known.iter().any(|o| &o.id == id);
            if !keep {
                tracing::warn!(order_id = %id, lines = items.len(), "Order closed elsewhere, dropping unsent lines");
            }
            keep
        });
        tracing::debug!(orders = self.orders.len(), "Orders refreshed");
        Ok(())
    }

    /// Refresh after a successful mutation; the mutation already happened,
    /// so a failed reload is logged, not reported
    async fn converge(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Refresh after mutation failed");
        }
    }

    /// Best-effort table status write; failures never undo the order change
    async fn set_tables_status(&mut self, binding: &TableBinding, status: TableStatus) {
        let update = DiningTableUpdate::status(status);
        for number in binding.members() {
            let Some(id) = self
                .tables
                .iter()
                .find(|t| t.number == number)
                .map(|t| t.id.clone())
            else {
                continue;
            };
            match self.backend.update_table(&id, &update).await {
                Ok(updated) => {
                    if let Some(t) = self.tables.iter_mut().find(|t| t.id == updated.id) {
                        *t = updated;
                    }
                }
                Err(e) => {
                    tracing::warn!(table = %number, status = ?status, error = %e, "Table status update failed");
                }
            }
        }
    }

    // ========== Starting orders ==========

    /// Tap in normal mode: resume the table's order or ask for a client count
    pub async fn tap_table(&mut self, number: &str) -> FloorResult<EventOutcome> {
        let table = self.table_by_number(number)?.clone();
        let index = self.occupancy();
        let candidates = self.resumable_orders();
        match decide_tap(&candidates, &index, &table, TapPurpose::Open) {
            TapDecision::Resume { order_id } => {
                let order = self.resume_order(&order_id).await?;
                Ok(EventOutcome::OrderOpened(order))
            }
            TapDecision::StartNew { number, capacity } => {
                let prompt = ClientCountPrompt {
                    binding: TableBinding::single(number),
                    capacity,
                };
                self.prompt = Some(prompt.clone());
                Ok(EventOutcome::PromptClientCount(prompt))
            }
            TapDecision::AlreadyOccupied { number } => Err(Rejection::TableOccupied(number).into()),
            TapDecision::Accept { .. } | TapDecision::NoOrder { .. } => Ok(EventOutcome::Nothing),
        }
    }

    /// Answer the client-count prompt; the new order becomes current
    pub fn confirm_client_count(&mut self, count: u32) -> FloorResult<Order> {
        let Some(prompt) = self.prompt.clone() else {
            return Err(Rejection::NoActiveOrder.into());
        };
        if count == 0 || count > prompt.capacity {
            return Err(Rejection::InvalidClientCount {
                count,
                capacity: prompt.capacity,
            }
            .into());
        }
        if self.occupancy().is_binding_occupied(&prompt.binding) {
            self.prompt = None;
            return Err(Rejection::TableOccupied(prompt.binding.key()).into());
        }
        self.prompt = None;
        Ok(self.open_draft(prompt.binding, count))
    }

    /// Takeout orders skip the prompt
    pub fn start_takeout(&mut self, client_count: u32) -> Order {
        self.prompt = None;
        self.open_draft(TableBinding::Takeout, client_count)
    }

    fn open_draft(&mut self, binding: TableBinding, client_count: u32) -> Order {
        let order = create_order(
            binding,
            client_count,
            self.config.default_tax_rate,
            self.config.staff_id.clone(),
        );
        tracing::debug!(order_id = %order.id, table = %order.table_number, client_count, "Draft order opened");
        self.park_current();
        self.current.replace(order.clone());
        order
    }

    /// Put the current order aside. Local drafts are kept whole; for a
    /// persisted order only the lines not yet sent are kept, to be folded
    /// back in when it is resumed.
    fn park_current(&mut self) {
        let Some(order) = self.current.take() else {
            return;
        };
        if order.is_temporary() {
            self.drafts.retain(|d| d.id != order.id);
            self.drafts.push(order);
            return;
        }
        let pending: Vec<OrderItem> = order.items.into_iter().filter(|i| i.is_temporary()).collect();
        if !pending.is_empty() {
            tracing::debug!(order_id = %order.id, lines = pending.len(), "Parking unsent lines");
            self.unsent.entry(order.id).or_default().extend(pending);
        }
    }

    // ========== Lifecycle ==========

    pub async fn hold_order(&mut self) -> FloorResult<Option<Order>> {
        self.persist(OrderStatus::Hold).await
    }

    /// Repeated calls while a send is in flight return `Ok(None)`
    pub async fn send_order(&mut self) -> FloorResult<Option<Order>> {
        self.persist(OrderStatus::Sent).await
    }

    pub async fn pay_order(&mut self) -> FloorResult<Option<Order>> {
        self.persist(OrderStatus::Paid).await
    }

    /// Create-if-temporary else update, then release the current order.
    ///
    /// Server ids are written back into the current order as soon as they
    /// are assigned, so retrying after a failure never re-creates what was
    /// already persisted.
    async fn persist(&mut self, status: OrderStatus) -> FloorResult<Option<Order>> {
        let Some(mut order) = self.current.get().cloned() else {
            return Err(Rejection::NoActiveOrder.into());
        };
        if !order.status.can_transition_to(status) {
            return Err(Rejection::InvalidTransition {
                from: order.status,
                to: status,
            }
            .into());
        }
        let Some(_guard) = SendingGuard::acquire(&self.sending) else {
            tracing::debug!(order_id = %order.id, "Persist already in flight, ignoring");
            return Ok(None);
        };

        if order.is_temporary() {
            let shell = Order {
                items: Vec::new(),
                ..order.clone()
            };
            let created = self.backend.create_order(&shell).await?;
            tracing::info!(order_id = %created.id, temp_id = %order.id, table = %created.table_number, "Order created");
            order.id = created.id;
            order.created_at = created.created_at;
            self.current.replace(order.clone());
        }

        for idx in 0..order.items.len() {
            if !order.items[idx].is_temporary() {
                continue;
            }
            let created = self.backend.create_item(&order.id, &order.items[idx]).await?;
            order.items[idx].id = created.id;
            self.current.replace(order.clone());
        }

        order.status = status;
        let saved = self.backend.update_order(&order).await?;
        tracing::info!(
            order_id = %saved.id,
            status = %saved.status,
            total = saved.total,
            "Order persisted"
        );

        let table_status = if status.is_paid() {
            TableStatus::Available
        } else {
            TableStatus::Occupied
        };
        self.set_tables_status(&saved.table_number, table_status).await;

        self.current.clear();
        self.converge().await;
        Ok(Some(saved))
    }

    /// Make an order current again.
    ///
    /// A persisted order is put back to `new` on the backend and its items
    /// reloaded; a local draft is just reselected.
    pub async fn resume_order(&mut self, order_id: &str) -> FloorResult<Order> {
        if let Some(current) = self.current.get()
            && current.id == order_id
        {
            return Ok(current.clone());
        }

        if is_temp_id(order_id) {
            let pos = self
                .drafts
                .iter()
                .position(|d| d.id == order_id)
                .ok_or(Rejection::NoActiveOrder)?;
            let draft = self.drafts.remove(pos);
            self.park_current();
            self.current.replace(draft.clone());
            return Ok(draft);
        }

        let mut order = self
            .backend
            .update_order_status(order_id, OrderStatus::New)
            .await?;
        order.items = self.backend.list_items(order_id).await?;

        self.park_current();
        if let Some(pending) = self.unsent.remove(order_id) {
            order.items.extend(pending);
        }
        let order = money::recompute(order);
        tracing::info!(order_id = %order.id, items = order.items.len(), "Order reopened");

        if let Some(known) = self.orders.iter_mut().find(|o| o.id == order.id) {
            *known = order.clone();
        }
        self.current.replace(order.clone());
        Ok(order)
    }

    /// Discard the current order. Only local drafts can be discarded.
    pub fn cancel_order(&mut self) -> FloorResult<Order> {
        let Some(order) = self.current.get() else {
            return Err(Rejection::NoActiveOrder.into());
        };
        if !order.is_temporary() {
            return Err(Rejection::NotCancellable(order.id.clone()).into());
        }
        let order = self.current.take().ok_or(Rejection::NoActiveOrder)?;
        tracing::debug!(order_id = %order.id, "Draft discarded");
        Ok(order)
    }

    /// Per-client subtotal of the current order
    pub fn bill_by_client(&self) -> Option<BTreeMap<u32, f64>> {
        self.current.get().map(merge::subtotal_by_client)
    }

    /// Per-original-table subtotal of the current order
    pub fn bill_by_table(&self) -> Option<Vec<(String, f64)>> {
        self.current.get().map(merge::subtotal_by_table)
    }

    // ========== Move / merge ==========

    /// Move an order to a free table
    pub async fn move_order(&mut self, order_id: &str, target: &str) -> FloorResult<Order> {
        self.table_by_number(target)?;
        if self.occupancy_all().is_occupied(target) {
            return Err(Rejection::TableOccupied(target.to_string()).into());
        }
        let binding = TableBinding::single(target);

        if is_temp_id(order_id) {
            if self.current.id() == Some(order_id)
                && let Some(mut draft) = self.current.take()
            {
                draft.table_number = binding;
                self.current.replace(draft.clone());
                return Ok(draft);
            }
            let draft = self
                .drafts
                .iter_mut()
                .find(|d| d.id == order_id)
                .ok_or(Rejection::NoActiveOrder)?;
            draft.table_number = binding;
            return Ok(draft.clone());
        }

        let previous = self
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.table_number.clone());
        let moved = self.backend.change_table(order_id, &binding).await?;
        tracing::info!(order_id, to = %binding, "Order moved");

        if let Some(previous) = previous {
            self.set_tables_status(&previous, TableStatus::Available).await;
        }
        self.set_tables_status(&binding, TableStatus::Occupied).await;

        if self.current.id() == Some(order_id)
            && let Some(mut current) = self.current.take()
        {
            current.table_number = moved.table_number.clone();
            self.current.replace(current);
        }
        self.converge().await;
        Ok(moved)
    }

    /// Fold the order on `source_table` into the order on `target_table`
    pub async fn merge_orders(&mut self, source_table: &str, target_table: &str) -> FloorResult<Order> {
        let target = merge::check_order_merge(&self.orders, source_table, target_table)?;
        let source_binding = self
            .orders
            .iter()
            .find(|o| o.id == target.source_order_id)
            .map(|o| o.table_number.clone());

        let merged = self
            .backend
            .merge_orders(&target.source_order_id, &target.target_order_id)
            .await?;
        tracing::info!(
            source_order = %target.source_order_id,
            target_order = %target.target_order_id,
            source_table,
            target_table,
            "Orders merged"
        );

        if let Some(pending) = self.unsent.remove(&target.source_order_id) {
            self.unsent.entry(merged.id.clone()).or_default().extend(pending);
        }

        let involved = matches!(
            self.current.id(),
            Some(id) if id == target.source_order_id || id == target.target_order_id
        );
        if involved && let Some(previous) = self.current.take() {
            // keep lines added locally since the last persist
            let mut refreshed = merged.clone();
            refreshed
                .items
                .extend(previous.items.into_iter().filter(|i| i.is_temporary()));
            if let Some(pending) = self.unsent.remove(&merged.id) {
                refreshed.items.extend(pending);
            }
            self.current.replace(money::recompute(refreshed));
        }

        if let Some(binding) = source_binding {
            self.set_tables_status(&binding, TableStatus::Available).await;
        }
        self.converge().await;
        Ok(merged)
    }

    pub fn begin_merge_tables(&mut self) {
        self.mode = InteractionMode::MergeTables(MergeSelection::new());
    }

    /// Toggle a table in the merge selection. Returns whether it is selected.
    pub fn toggle_merge_table(&mut self, number: &str) -> FloorResult<bool> {
        self.table_by_number(number)?;
        let index = self.occupancy_all();
        match &mut self.mode {
            InteractionMode::MergeTables(selection) => Ok(selection.toggle(number, &index)?),
            _ => Ok(false),
        }
    }

    /// Confirm the merge selection; the client-count prompt follows
    pub fn confirm_merge_tables(&mut self) -> FloorResult<MergePlan> {
        let InteractionMode::MergeTables(selection) = &self.mode else {
            return Err(Rejection::TooFewTables(0).into());
        };
        let plan = selection.confirm(&self.tables)?;
        tracing::debug!(binding = %plan.binding, capacity = plan.capacity, "Table merge confirmed");
        self.prompt = Some(ClientCountPrompt {
            binding: plan.binding.clone(),
            capacity: plan.capacity,
        });
        self.mode = InteractionMode::Normal;
        Ok(plan)
    }

    // ========== Links ==========

    pub async fn link_tables(&mut self, leader: &str, members: &[String]) -> FloorResult<LinkGroup> {
        let request = link::validate_link(&self.tables, &self.orders, leader, members)?;
        let group = self.backend.create_link(&request).await?;
        tracing::info!(group_id = %group.group_id, leader, members = ?group.members, "Tables linked");
        if let Err(e) = self.refresh_tables().await {
            tracing::warn!(error = %e, "Refresh after link failed");
        }
        Ok(group)
    }

    /// Remove one table from its group, or dissolve the whole group.
    /// Returns what is left of the group.
    pub async fn unlink_table(&mut self, table: &str, unlink_all: bool) -> FloorResult<Option<LinkGroup>> {
        if self.table_by_number(table)?.group_id.is_none() {
            return Err(Rejection::TableNotLinked(table.to_string()).into());
        }
        let remaining = self
            .backend
            .unlink(&LinkRemove {
                table: table.to_string(),
                unlink_all,
            })
            .await?;
        tracing::info!(table, unlink_all, dissolved = remaining.is_none(), "Table unlinked");
        if let Err(e) = self.refresh_tables().await {
            tracing::warn!(error = %e, "Refresh after unlink failed");
        }
        Ok(remaining)
    }

    /// Pay every order of the group `table` belongs to.
    ///
    /// Partial success comes back as [`FloorError::PartialPayment`] with the
    /// per-order report.
    ///
    /// [`FloorError::PartialPayment`]: crate::error::FloorError::PartialPayment
    pub async fn pay_linked(&mut self, table: &str) -> FloorResult<LinkedPaymentReport> {
        if self.table_by_number(table)?.group_id.is_none() {
            return Err(Rejection::TableNotLinked(table.to_string()).into());
        }
        let report = LinkedPaymentReport::from(self.backend.pay_linked(table).await?);

        for (number, order_id) in report.paid.clone() {
            // 合并桌的单要释放整组桌
            let binding = self
                .orders
                .iter()
                .find(|o| o.id == order_id)
                .map(|o| o.table_number.clone())
                .unwrap_or_else(|| TableBinding::single(number));
            self.set_tables_status(&binding, TableStatus::Available).await;
            if self.current.id() == Some(order_id.as_str()) {
                self.current.clear();
            }
        }
        if report.is_complete() {
            tracing::info!(group_id = %report.group_id, paid = report.paid.len(), "Linked payment completed");
        } else {
            tracing::warn!(
                group_id = %report.group_id,
                paid = report.paid.len(),
                failed = report.failed.len(),
                "Linked payment partially failed"
            );
        }
        self.converge().await;
        report.into_result()
    }

    fn toggle_link_member(&mut self, number: &str) -> FloorResult<bool> {
        let table = self.table_by_number(number)?;
        let already_linked = table.group_id.clone();
        let InteractionMode::LinkTables { leader, members } = &mut self.mode else {
            return Ok(false);
        };
        if leader == number {
            return Ok(false);
        }
        if let Some(pos) = members.iter().position(|m| m == number) {
            members.remove(pos);
            return Ok(false);
        }
        if let Some(group_id) = already_linked {
            return Err(Rejection::TableAlreadyLinked {
                table: number.to_string(),
                group_id,
            }
            .into());
        }
        members.push(number.to_string());
        Ok(true)
    }

    /// Link the leader with the tables picked in link mode
    pub async fn confirm_link(&mut self) -> FloorResult<LinkGroup> {
        let InteractionMode::LinkTables { leader, members } = &self.mode else {
            return Err(Rejection::TooFewTables(0).into());
        };
        let (leader, members) = (leader.clone(), members.clone());
        let group = self.link_tables(&leader, &members).await?;
        self.mode = InteractionMode::Normal;
        Ok(group)
    }

    // ========== Layout ==========

    pub async fn move_table(&mut self, id: &str, x: f64, y: f64) -> FloorResult<DiningTable> {
        let updated = self
            .backend
            .update_table(id, &DiningTableUpdate::position(x, y))
            .await?;
        self.store_table(updated.clone());
        Ok(updated)
    }

    pub async fn rotate_table(&mut self, id: &str, delta: f64) -> FloorResult<DiningTable> {
        let current = self
            .tables
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.geometry.rotation)
            .ok_or_else(|| Rejection::TableNotFound(id.to_string()))?;
        let rotation = normalize_rotation(current + delta);
        let updated = self
            .backend
            .update_table(id, &DiningTableUpdate::rotation(rotation))
            .await?;
        self.store_table(updated.clone());
        Ok(updated)
    }

    fn store_table(&mut self, table: DiningTable) {
        match self.tables.iter_mut().find(|t| t.id == table.id) {
            Some(t) => *t = table,
            None => self.tables.push(table),
        }
    }

    // ========== Renderer events ==========

    pub fn cancel_mode(&mut self) {
        self.mode = InteractionMode::Normal;
        self.prompt = None;
    }

    pub async fn handle_event(&mut self, event: FloorEvent) -> FloorResult<EventOutcome> {
        match event {
            FloorEvent::TableTap { number, .. } => self.handle_tap(&number).await,
            FloorEvent::TableMove { id, x, y } => {
                Ok(EventOutcome::TableUpdated(self.move_table(&id, x, y).await?))
            }
            FloorEvent::TableRotate { id, delta } => {
                Ok(EventOutcome::TableUpdated(self.rotate_table(&id, delta).await?))
            }
            FloorEvent::ContextAction {
                action,
                table_number,
            } => self.handle_action(action, &table_number).await,
        }
    }

    async fn handle_tap(&mut self, number: &str) -> FloorResult<EventOutcome> {
        match self.mode.clone() {
            InteractionMode::Normal => self.tap_table(number).await,
            InteractionMode::MergeTables(_) => {
                self.toggle_merge_table(number)?;
                Ok(EventOutcome::SelectionChanged)
            }
            InteractionMode::MergeOrders { source_table } => {
                let merged = self.merge_orders(&source_table, number).await?;
                self.mode = InteractionMode::Normal;
                Ok(EventOutcome::OrdersMerged(merged))
            }
            InteractionMode::MoveOrder { order_id } => {
                let moved = self.move_order(&order_id, number).await?;
                self.mode = InteractionMode::Normal;
                Ok(EventOutcome::OrderMoved(moved))
            }
            InteractionMode::LinkTables { .. } => {
                self.toggle_link_member(number)?;
                Ok(EventOutcome::SelectionChanged)
            }
        }
    }

    async fn handle_action(&mut self, action: ContextAction, number: &str) -> FloorResult<EventOutcome> {
        let table = self.table_by_number(number)?.clone();
        match action {
            ContextAction::MergeTables => {
                let mut selection = MergeSelection::new();
                selection.toggle(number, &self.occupancy_all())?;
                self.mode = InteractionMode::MergeTables(selection);
            }
            ContextAction::MergeOrders => {
                if find_order_for_table(&self.orders, number).is_none() {
                    return Err(Rejection::TableHasNoOrder(number.to_string()).into());
                }
                self.mode = InteractionMode::MergeOrders {
                    source_table: number.to_string(),
                };
            }
            ContextAction::MoveOrderTable => {
                let candidates = self.resumable_orders();
                let order = find_order_for_table(&candidates, number)
                    .ok_or_else(|| Rejection::TableHasNoOrder(number.to_string()))?;
                self.mode = InteractionMode::MoveOrder {
                    order_id: order.id.clone(),
                };
            }
            ContextAction::LinkTables => {
                if let Some(group_id) = table.group_id {
                    return Err(Rejection::TableAlreadyLinked {
                        table: number.to_string(),
                        group_id,
                    }
                    .into());
                }
                if find_order_for_table(&self.orders, number).is_none() {
                    return Err(Rejection::LeaderWithoutOrder(number.to_string()).into());
                }
                self.mode = InteractionMode::LinkTables {
                    leader: number.to_string(),
                    members: Vec::new(),
                };
            }
            ContextAction::UnlinkTable => {
                return Ok(EventOutcome::Unlinked(self.unlink_table(number, false).await?));
            }
        }
        tracing::debug!(action = %action, table = number, "Interaction mode changed");
        Ok(EventOutcome::ModeChanged)
    }

    // ========== Projection ==========

    /// Table list for the renderer
    pub fn view(&self) -> Vec<TableView> {
        let drafts = self.local_orders();
        let index = self.occupancy();
        let preview = match &self.mode {
            InteractionMode::MergeTables(selection) => Some(selection.numbers()),
            _ => None,
        };
        view::project(&FloorSnapshot {
            tables: &self.tables,
            orders: &self.orders,
            drafts: &drafts,
            index: &index,
            preview,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(370.0), 10.0);
        assert_eq!(normalize_rotation(-90.0), 270.0);
        assert_eq!(normalize_rotation(360.0), 0.0);
        assert_eq!(normalize_rotation(45.0), 45.0);
    }

    #[test]
    fn test_sending_guard_is_exclusive() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = SendingGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(SendingGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(SendingGuard::acquire(&flag).is_some());
    }
}
