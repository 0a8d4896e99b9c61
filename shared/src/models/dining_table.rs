//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status as stored by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Pending,
    Occupied,
    Reserved,
}

/// Outline drawn by the table map
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableShape {
    #[default]
    Rectangle,
    Square,
    Circle,
}

/// Table placement on the floor plan (layout units, rotation in degrees)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct TableGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub shape: TableShape,
}

impl TableGeometry {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiningTable {
    pub id: String,
    /// Short human-facing number ("3", "12")
    pub number: String,
    pub capacity: u32,
    #[serde(default)]
    pub status: TableStatus,
    #[serde(flatten)]
    pub geometry: TableGeometry,
    /// Link group membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// `#RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl DiningTable {
    pub fn new(id: impl Into<String>, number: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            capacity,
            status: TableStatus::Available,
            geometry: TableGeometry::default(),
            group_id: None,
            color: None,
        }
    }

    /// Place the table on the floor plan
    pub fn placed(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.geometry = TableGeometry {
            x,
            y,
            width,
            height,
            ..self.geometry
        };
        self
    }

    pub fn is_linked(&self) -> bool {
        self.group_id.is_some()
    }
}

/// Update dining table payload
///
/// Only the fields this engine writes; layout editing goes through the editor.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TableStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl DiningTableUpdate {
    pub fn status(status: TableStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    /// Apply this update onto a table record
    pub fn apply_to(&self, table: &mut DiningTable) {
        if let Some(status) = self.status {
            table.status = status;
        }
        if let Some(x) = self.x {
            table.geometry.x = x;
        }
        if let Some(y) = self.y {
            table.geometry.y = y;
        }
        if let Some(rotation) = self.rotation {
            table.geometry.rotation = rotation;
        }
        if let Some(color) = &self.color {
            table.color = Some(color.clone());
        }
    }
}
