//! Merge coordinator
//!
//! Two different operations live here:
//! - merging *tables*: several free tables become one composite binding with
//!   one new order and a combined outline on the map
//! - merging *orders*: an existing order is folded into another one, items
//!   keep a `source_table` tag for the per-table breakdown

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::util::{natural_cmp, now_millis};
use shared::{DiningTable, Order, OrderItem, TableBinding, TableGeometry, TableShape};

use crate::error::Rejection;
use crate::money;
use crate::occupancy::{OccupancyIndex, find_order_for_table};

/// Minimum tables for a merge
pub const MIN_MERGE_TABLES: usize = 2;

// ============================================================================
// Table merge
// ============================================================================

/// Pending selection while in merge-tables mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSelection {
    numbers: Vec<String>,
}

impl MergeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a table in or out. Returns whether it is selected afterwards.
    ///
    /// Occupied tables cannot join a merge.
    pub fn toggle(&mut self, number: &str, index: &OccupancyIndex) -> Result<bool, Rejection> {
        if let Some(pos) = self.numbers.iter().position(|n| n == number) {
            self.numbers.remove(pos);
            return Ok(false);
        }
        if index.is_occupied(number) {
            return Err(Rejection::TableOccupied(number.to_string()));
        }
        self.numbers.push(number.to_string());
        Ok(true)
    }

    pub fn contains(&self, number: &str) -> bool {
        self.numbers.iter().any(|n| n == number)
    }

    pub fn numbers(&self) -> &[String] {
        &self.numbers
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Binding the selection would produce (also used for the live preview)
    pub fn binding(&self) -> TableBinding {
        TableBinding::merged(&self.numbers)
    }

    /// Resolve the selection against the floor plan
    pub fn confirm(&self, tables: &[DiningTable]) -> Result<MergePlan, Rejection> {
        if self.numbers.len() < MIN_MERGE_TABLES {
            return Err(Rejection::TooFewTables(self.numbers.len()));
        }
        let mut members = Vec::with_capacity(self.numbers.len());
        for number in &self.numbers {
            let table = tables
                .iter()
                .find(|t| &t.number == number)
                .ok_or_else(|| Rejection::TableNotFound(number.clone()))?;
            members.push(table);
        }
        members.sort_by(|a, b| natural_cmp(&a.number, &b.number));
        Ok(MergePlan::from_tables(&members))
    }
}

/// Result of a confirmed table merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    pub binding: TableBinding,
    /// Sum of member capacities, the upper bound of the client-count prompt
    pub capacity: u32,
    pub geometry: TableGeometry,
}

impl MergePlan {
    pub fn from_tables(tables: &[&DiningTable]) -> Self {
        let geometries: Vec<TableGeometry> = tables.iter().map(|t| t.geometry).collect();
        Self {
            binding: TableBinding::merged(tables.iter().map(|t| t.number.as_str())),
            capacity: tables.iter().map(|t| t.capacity).sum(),
            geometry: merged_geometry(&geometries),
        }
    }
}

/// Outline of tables pushed together.
///
/// Takes the axis-aligned bounding box of all members. A box at least as
/// tall as it is wide is read as a column: width = widest member, height =
/// Σ heights. Otherwise a row: width = Σ widths, height = tallest member.
/// Positioned at the bounding box's top-left corner.
pub fn merged_geometry(members: &[TableGeometry]) -> TableGeometry {
    let Some(first) = members.first() else {
        return TableGeometry::default();
    };
    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.right(), first.bottom());
    for g in &members[1..] {
        min_x = min_x.min(g.x);
        min_y = min_y.min(g.y);
        max_x = max_x.max(g.right());
        max_y = max_y.max(g.bottom());
    }

    let max_width = members.iter().map(|g| g.width).fold(0.0, f64::max);
    let max_height = members.iter().map(|g| g.height).fold(0.0, f64::max);
    let sum_width: f64 = members.iter().map(|g| g.width).sum();
    let sum_height: f64 = members.iter().map(|g| g.height).sum();

    let vertical = (max_y - min_y) >= (max_x - min_x);
    let (width, height) = if vertical {
        (max_width, sum_height)
    } else {
        (sum_width, max_height)
    };

    TableGeometry {
        x: min_x,
        y: min_y,
        width,
        height,
        rotation: 0.0,
        shape: TableShape::Rectangle,
    }
}

// ============================================================================
// Order merge
// ============================================================================

/// Orders resolved for an order merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMergeTarget {
    pub source_order_id: String,
    pub target_order_id: String,
}

/// Both tables need an order, and they must be different orders
pub fn check_order_merge(
    orders: &[Order],
    source_table: &str,
    target_table: &str,
) -> Result<OrderMergeTarget, Rejection> {
    if source_table == target_table {
        return Err(Rejection::MergeSameOrder);
    }
    let source = find_order_for_table(orders, source_table)
        .ok_or_else(|| Rejection::TableHasNoOrder(source_table.to_string()))?;
    let target = find_order_for_table(orders, target_table)
        .ok_or_else(|| Rejection::TableHasNoOrder(target_table.to_string()))?;
    if source.id == target.id {
        return Err(Rejection::MergeSameOrder);
    }
    Ok(OrderMergeTarget {
        source_order_id: source.id.clone(),
        target_order_id: target.id.clone(),
    })
}

/// Fold `source` into `target`.
///
/// Folded items are tagged with the source table unless an earlier merge
/// already tagged them. `merged_from` gains the source table and whatever
/// the source had merged before.
pub fn fold_order(source: &Order, mut target: Order) -> Order {
    let source_table = source.table_number.key();
    for item in &source.items {
        let mut folded = item.clone();
        if folded.source_table.is_none() {
            folded.source_table = Some(source_table.clone());
        }
        target.items.push(folded);
    }
    for table in std::iter::once(&source_table).chain(source.merged_from.iter()) {
        if !table.is_empty() && !target.merged_from.contains(table) {
            target.merged_from.push(table.clone());
        }
    }
    target.updated_at = now_millis();
    money::recompute(target)
}

// ============================================================================
// Breakdowns
// ============================================================================

/// Subtotal per original table, falling back to the order's own binding for
/// untagged items. Sorted by natural table order.
pub fn subtotal_by_table(order: &Order) -> Vec<(String, f64)> {
    let own = order.table_number.key();
    let mut groups: BTreeMap<String, Decimal> = BTreeMap::new();
    for item in &order.items {
        let key = item.source_table.clone().unwrap_or_else(|| own.clone());
        *groups.entry(key).or_default() += money::line_total(item);
    }
    let mut out: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(k, v)| (k, money::to_f64(v)))
        .collect();
    out.sort_by(|a, b| natural_cmp(&a.0, &b.0));
    out
}

/// Items ordered by one client
pub fn client_items(order: &Order, client: u32) -> Vec<&OrderItem> {
    order
        .items
        .iter()
        .filter(|i| i.client_number == client)
        .collect()
}

/// Subtotal per client number
pub fn subtotal_by_client(order: &Order) -> BTreeMap<u32, f64> {
    let mut groups: BTreeMap<u32, Decimal> = BTreeMap::new();
    for item in &order.items {
        *groups.entry(item.client_number).or_default() += money::line_total(item);
    }
    groups
        .into_iter()
        .map(|(k, v)| (k, money::to_f64(v)))
        .collect()
}
