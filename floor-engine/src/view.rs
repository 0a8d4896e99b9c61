//! Projection for the table-map renderer
//!
//! Each table gets a derived status and colors; merged orders and the live
//! merge preview become synthetic records (`merged-<binding>`,
//! `preview-<binding>`) carrying the combined outline.

use serde::{Deserialize, Serialize};
use shared::{DiningTable, Order, TableBinding, TableGeometry, TableStatus};

use crate::merge::{MIN_MERGE_TABLES, merged_geometry};
use crate::occupancy::OccupancyIndex;

pub const MERGED_PREFIX: &str = "merged-";
pub const PREVIEW_PREFIX: &str = "preview-";

/// Used when a table has no color of its own
pub const DEFAULT_TABLE_COLOR: &str = "#4F8A8B";
/// Alpha suffix for free tables (40%)
const TRANSLUCENT_ALPHA: &str = "66";

const TEXT_DARK: &str = "#1F2937";
const TEXT_LIGHT: &str = "#FFFFFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Table,
    Merged,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub id: String,
    pub number: String,
    pub kind: ViewKind,
    pub capacity: u32,
    pub status: TableStatus,
    #[serde(flatten)]
    pub geometry: TableGeometry,
    /// `#RRGGBB` when occupied, `#RRGGBBAA` otherwise
    pub color: String,
    pub text_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Everything the projection reads
pub struct FloorSnapshot<'a> {
    pub tables: &'a [DiningTable],
    /// Persisted active orders (composite ones become merged records)
    pub orders: &'a [Order],
    /// Local drafts, shown as pending
    pub drafts: &'a [Order],
    /// Decides occupied vs free
    pub index: &'a OccupancyIndex,
    /// Tables selected in merge mode
    pub preview: Option<&'a [String]>,
}

/// `#abc`, `#aabbcc` or `#aabbccdd` -> `#AABBCC`; anything else -> default
pub fn normalize_color(color: Option<&str>) -> String {
    let Some(raw) = color.map(str::trim).and_then(|c| c.strip_prefix('#')) else {
        return DEFAULT_TABLE_COLOR.to_string();
    };
    if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return DEFAULT_TABLE_COLOR.to_string();
    }
    let hex = match raw.len() {
        3 => raw.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 | 8 => raw[..6].to_string(),
        _ => return DEFAULT_TABLE_COLOR.to_string(),
    };
    format!("#{}", hex.to_ascii_uppercase())
}

fn fill_color(base: &str, occupied: bool) -> String {
    if occupied {
        base.to_string()
    } else {
        format!("{}{}", base, TRANSLUCENT_ALPHA)
    }
}

/// Light text on dark vivid fills, dark text otherwise
fn text_color(base: &str, occupied: bool) -> String {
    if !occupied {
        return TEXT_DARK.to_string();
    }
    let channel = |i: usize| u8::from_str_radix(&base[i..i + 2], 16).unwrap_or(0) as f64;
    let luminance = 0.299 * channel(1) + 0.587 * channel(3) + 0.114 * channel(5);
    if luminance < 150.0 {
        TEXT_LIGHT.to_string()
    } else {
        TEXT_DARK.to_string()
    }
}

fn covered_by(orders: &[Order], number: &str) -> bool {
    orders
        .iter()
        .any(|o| o.is_active() && o.table_number.contains(number))
}

/// Draft first (not sent yet), then the terminal's occupancy index, which
/// already carries the staff scope
fn derive_status(snapshot: &FloorSnapshot<'_>, table: &DiningTable) -> TableStatus {
    if covered_by(snapshot.drafts, &table.number) {
        TableStatus::Pending
    } else if snapshot.index.is_occupied(&table.number) {
        TableStatus::Occupied
    } else if table.status == TableStatus::Reserved {
        TableStatus::Reserved
    } else {
        TableStatus::Available
    }
}

fn table_view(snapshot: &FloorSnapshot<'_>, table: &DiningTable) -> TableView {
    let status = derive_status(snapshot, table);
    let occupied = status == TableStatus::Occupied;
    let base = normalize_color(table.color.as_deref());
    TableView {
        id: table.id.clone(),
        number: table.number.clone(),
        kind: ViewKind::Table,
        capacity: table.capacity,
        status,
        geometry: table.geometry,
        color: fill_color(&base, occupied),
        text_color: text_color(&base, occupied),
        group_id: table.group_id.clone(),
    }
}

fn composite_view(
    tables: &[DiningTable],
    binding: &TableBinding,
    kind: ViewKind,
    status: TableStatus,
) -> Option<TableView> {
    let members: Vec<&DiningTable> = binding
        .members()
        .into_iter()
        .filter_map(|n| tables.iter().find(|t| t.number == n))
        .collect();
    if members.len() < MIN_MERGE_TABLES {
        return None;
    }
    let geometries: Vec<TableGeometry> = members.iter().map(|t| t.geometry).collect();
    let occupied = status == TableStatus::Occupied;
    let base = normalize_color(members[0].color.as_deref());
    let prefix = match kind {
        ViewKind::Preview => PREVIEW_PREFIX,
        _ => MERGED_PREFIX,
    };
    Some(TableView {
        id: format!("{}{}", prefix, binding),
        number: binding.key(),
        kind,
        capacity: members.iter().map(|t| t.capacity).sum(),
        status,
        geometry: merged_geometry(&geometries),
        color: fill_color(&base, occupied),
        text_color: text_color(&base, occupied),
        group_id: None,
    })
}

/// Build the renderer's table list
pub fn project(snapshot: &FloorSnapshot<'_>) -> Vec<TableView> {
    let mut views: Vec<TableView> = snapshot
        .tables
        .iter()
        .map(|t| table_view(snapshot, t))
        .collect();

    let composites = snapshot
        .orders
        .iter()
        .map(|o| (o, TableStatus::Occupied))
        .chain(snapshot.drafts.iter().map(|o| (o, TableStatus::Pending)));
    let mut seen: Vec<String> = Vec::new();
    for (order, status) in composites {
        if !order.is_active() || !order.table_number.is_composite() {
            continue;
        }
        let key = order.table_number.key();
        // 其他员工的合并桌不画
        let out_of_scope = status == TableStatus::Occupied && !snapshot.index.contains(&key);
        if out_of_scope || seen.contains(&key) {
            continue;
        }
        if let Some(view) = composite_view(snapshot.tables, &order.table_number, ViewKind::Merged, status) {
            views.push(view);
        }
        seen.push(key);
    }

    if let Some(selected) = snapshot.preview
        && selected.len() >= MIN_MERGE_TABLES
        && let Some(view) = composite_view(
            snapshot.tables,
            &TableBinding::merged(selected),
            ViewKind::Preview,
            TableStatus::Pending,
        )
    {
        views.push(view);
    }

    views
}
