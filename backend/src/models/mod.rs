//! Domain models for the fuelmap pipeline.
//!
//! - [`CellValue`] - A single raw cell (empty, number or text)
//! - [`RawRow`] / [`RawTable`] - The table as delivered by the source
//! - [`CowStatus`] - The two operational statuses kept on the dashboard
//! - [`CleanRecord`] - One dashboard site, the unit of the output array

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Raw cells
// =============================================================================

/// A raw cell value as delivered by the source table.
///
/// CSV sources only produce [`CellValue::Empty`] and [`CellValue::Text`];
/// the text is kept verbatim and read as a number only where a number is
/// wanted (day serials, coordinates). Serializes untagged: `null`, a JSON
/// number, or a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Blank or missing cell.
    Empty,
    /// Typed numeric cell, from sources that carry cell types.
    Number(f64),
    /// Any other content, kept verbatim.
    Text(String),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// Build a cell from CSV field text: blank is empty, anything else is
    /// kept as text exactly as written.
    pub fn from_field(raw: &str) -> Self {
        if raw.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    /// The cell as a number: typed numbers directly, text when its trimmed
    /// form parses as a float (which may be NaN or infinite).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// The cell rendered as text, `None` when missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) if n.is_nan() => None,
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) => Some(s.clone()),
        }
    }

    /// The cell as a finite float: numbers directly, text when its trimmed
    /// form parses.
    pub fn as_finite_f64(&self) -> Option<f64> {
        self.as_f64().filter(|n| n.is_finite())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

// =============================================================================
// Raw table
// =============================================================================

/// One data row, holding a cell per table header in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<CellValue>,
}

impl RawRow {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Cell at column `index`; out-of-range columns read as empty.
    pub fn get(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

/// A fully materialized source table.
///
/// Every row has exactly one cell per header: short rows are padded with
/// [`CellValue::Empty`] and surplus cells are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.cells.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Header labels exactly as they appeared in the source.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as JSON objects keyed by header, for debugging output.
    pub fn to_json_rows(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = self
                    .headers
                    .iter()
                    .zip(row.cells())
                    .map(|(h, c)| (h.clone(), serde_json::to_value(c).unwrap_or_default()))
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect()
    }
}

// =============================================================================
// COW Status
// =============================================================================

/// Operational status of a cell-on-wheels site.
///
/// Only these two statuses survive the status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CowStatus {
    /// Site is transmitting.
    #[serde(rename = "ON-AIR")]
    OnAir,
    /// Site is being deployed.
    #[serde(rename = "IN PROGRESS")]
    InProgress,
}

impl CowStatus {
    /// Parse a status cell: trimmed, upper-cased, exact match.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "ON-AIR" => Some(Self::OnAir),
            "IN PROGRESS" => Some(Self::InProgress),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnAir => "ON-AIR",
            Self::InProgress => "IN PROGRESS",
        }
    }
}

impl std::fmt::Display for CowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Clean Record
// =============================================================================

/// One site on the fueling dashboard.
///
/// Serialized with the exact field names the front end reads;
/// `NextFuelingPlan` is an ISO `YYYY-MM-DD` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    #[serde(rename = "SiteName")]
    pub site_name: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "COWStatus")]
    pub cow_status: CowStatus,
    #[serde(rename = "NextFuelingPlan")]
    pub next_fueling_plan: NaiveDate,
    pub lat: f64,
    pub lng: f64,
}
