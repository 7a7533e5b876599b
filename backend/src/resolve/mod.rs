//! Header to logical field resolution.
//!
//! The fueling sheet has been re-exported with renamed, re-spaced and
//! re-cased headers more than once. Instead of looking columns up by exact
//! label on every row, the header is resolved once per table into a
//! [`FieldMap`] using an alias table per [`LogicalField`].
//!
//! Header labels are normalized before matching: trimmed, lower-cased, with
//! all whitespace and underscores removed, so `" Region Name "`,
//! `"region_name"` and `"REGIONNAME"` are the same column.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::models::{CellValue, RawRow};

static HEADER_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_]+").expect("valid header regex"));

/// A canonical slot the pipeline reads, whatever the sheet calls it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    SiteName,
    Region,
    Status,
    FuelingPlan,
    Latitude,
    Longitude,
}

impl LogicalField {
    /// All mandatory fields, in report order.
    pub const ALL: [LogicalField; 6] = [
        LogicalField::SiteName,
        LogicalField::Region,
        LogicalField::Status,
        LogicalField::FuelingPlan,
        LogicalField::Latitude,
        LogicalField::Longitude,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SiteName => "site name",
            Self::Region => "region",
            Self::Status => "status",
            Self::FuelingPlan => "next fueling plan",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
        }
    }

    fn slot(&self) -> usize {
        match self {
            Self::SiteName => 0,
            Self::Region => 1,
            Self::Status => 2,
            Self::FuelingPlan => 3,
            Self::Latitude => 4,
            Self::Longitude => 5,
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize a header label for matching.
pub fn normalize_header(label: &str) -> String {
    HEADER_NOISE
        .replace_all(label.trim(), "")
        .to_lowercase()
}

/// Accepted (normalized) header names per logical field.
///
/// Aliases are tried in order; earlier aliases take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAliases {
    aliases: [Vec<String>; 6],
}

impl ColumnAliases {
    /// Aliases of `field`, in priority order.
    pub fn for_field(&self, field: LogicalField) -> &[String] {
        &self.aliases[field.slot()]
    }

    /// Accept one more header name for `field`, after the existing ones.
    pub fn with_alias(mut self, field: LogicalField, alias: &str) -> Self {
        let alias = normalize_header(alias);
        let list = &mut self.aliases[field.slot()];
        if !list.contains(&alias) {
            list.push(alias);
        }
        self
    }
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let list = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            aliases: [
                list(&["sitename", "site"]),
                list(&["regionname", "region", "regionnam"]),
                list(&["cowstatus", "status"]),
                list(&["nextfuelingplan", "nextfueldate"]),
                list(&["lat", "latitude"]),
                list(&["lng", "long", "lon", "longitude"]),
            ],
        }
    }
}

/// Column index of every logical field in one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    columns: [usize; 6],
}

impl FieldMap {
    /// Column index holding `field`.
    pub fn column(&self, field: LogicalField) -> usize {
        self.columns[field.slot()]
    }

    /// `(field, column index)` pairs in [`LogicalField::ALL`] order.
    pub fn entries(&self) -> impl Iterator<Item = (LogicalField, usize)> + '_ {
        LogicalField::ALL.iter().map(move |f| (*f, self.column(*f)))
    }
}

/// A raw row viewed through the table's [`FieldMap`].
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRow<'a> {
    row: &'a RawRow,
    fields: &'a FieldMap,
}

impl<'a> ResolvedRow<'a> {
    pub fn new(row: &'a RawRow, fields: &'a FieldMap) -> Self {
        Self { row, fields }
    }

    /// The raw cell located for `field`.
    pub fn get(&self, field: LogicalField) -> &'a CellValue {
        self.row.get(self.fields.column(field))
    }

    /// The cell for `field` as trimmed text, `None` when missing.
    pub fn text(&self, field: LogicalField) -> Option<String> {
        self.get(field).as_text().map(|s| s.trim().to_string())
    }

    pub fn raw(&self) -> &'a RawRow {
        self.row
    }
}

/// Resolve headers with the default alias table.
pub fn resolve_columns(headers: &[String]) -> Result<FieldMap, ResolveError> {
    resolve_with_aliases(headers, &ColumnAliases::default())
}

/// Resolve headers against `aliases`.
///
/// For each field, aliases are tried in order and the left-most header
/// matching an alias wins. Fails with every unmatched field at once.
pub fn resolve_with_aliases(
    headers: &[String],
    aliases: &ColumnAliases,
) -> Result<FieldMap, ResolveError> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let mut columns = [0usize; 6];
    let mut missing = Vec::new();

    for field in LogicalField::ALL {
        let found = aliases
            .for_field(field)
            .iter()
            .find_map(|alias| normalized.iter().position(|h| h == alias));

        match found {
            Some(idx) => columns[field.slot()] = idx,
            None => missing.push(field),
        }
    }

    if missing.is_empty() {
        Ok(FieldMap { columns })
    } else {
        Err(ResolveError::MissingFields {
            missing,
            available: normalized,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Region Name "), "regionname");
        assert_eq!(normalize_header("Next_Fueling Plan"), "nextfuelingplan");
        assert_eq!(normalize_header("COW\tStatus"), "cowstatus");
        assert_eq!(normalize_header("lat"), "lat");
    }

    #[test]
    fn test_resolve_sheet_headers() {
        let h = headers(&[
            "ID", "Site Name", "Site Type", "Region Name", "COW Status", "Lat", "Lng",
            "NextFuelingPlan",
        ]);
        let map = resolve_columns(&h).unwrap();
        assert_eq!(map.column(LogicalField::SiteName), 1);
        assert_eq!(map.column(LogicalField::Region), 3);
        assert_eq!(map.column(LogicalField::Status), 4);
        assert_eq!(map.column(LogicalField::Latitude), 5);
        assert_eq!(map.column(LogicalField::Longitude), 6);
        assert_eq!(map.column(LogicalField::FuelingPlan), 7);
    }

    #[test]
    fn test_resolve_aliases() {
        let h = headers(&["site", "REGION", "status", "next_fuel_date", "latitude", "longitude"]);
        let map = resolve_columns(&h).unwrap();
        assert_eq!(map.column(LogicalField::Region), 1);
        assert_eq!(map.column(LogicalField::FuelingPlan), 3);
        assert_eq!(map.column(LogicalField::Longitude), 5);
    }

    #[test]
    fn test_alias_priority_is_deterministic() {
        // "regionname" outranks "region" even when it appears later
        let h = headers(&["Region", "SiteName", "RegionName", "COWStatus", "NextFuelingPlan", "lat", "lng"]);
        let map = resolve_columns(&h).unwrap();
        assert_eq!(map.column(LogicalField::Region), 2);
        assert_eq!(resolve_columns(&h).unwrap(), map);
    }

    #[test]
    fn test_duplicate_headers_pick_leftmost() {
        let h = headers(&["SiteName", "Region", "COWStatus", "NextFuelingPlan", "lat", "lat", "lng"]);
        let map = resolve_columns(&h).unwrap();
        assert_eq!(map.column(LogicalField::Latitude), 4);
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let h = headers(&["Site Name", "Region Name", "Lat"]);
        let err = resolve_columns(&h).unwrap_err();
        match err {
            ResolveError::MissingFields { missing, available } => {
                assert_eq!(
                    missing,
                    vec![LogicalField::Status, LogicalField::FuelingPlan, LogicalField::Longitude]
                );
                assert_eq!(available, vec!["sitename", "regionname", "lat"]);
            }
        }
    }

    #[test]
    fn test_custom_alias() {
        let h = headers(&["SiteName", "Region", "COWStatus", "Fuel Plan", "lat", "lng"]);
        assert!(resolve_columns(&h).is_err());

        let aliases = ColumnAliases::default().with_alias(LogicalField::FuelingPlan, "Fuel Plan");
        let map = resolve_with_aliases(&h, &aliases).unwrap();
        assert_eq!(map.column(LogicalField::FuelingPlan), 3);
    }

    #[test]
    fn test_resolved_row_lookup() {
        let h = headers(&["SiteName", "Region", "COWStatus", "NextFuelingPlan", "lat", "lng"]);
        let map = resolve_columns(&h).unwrap();
        let row = RawRow::new(vec![
            " Site1 ".into(),
            "Central".into(),
            "On-Air".into(),
            "12-15-2025".into(),
            CellValue::Number(24.7),
        ]);
        let resolved = ResolvedRow::new(&row, &map);
        assert_eq!(resolved.text(LogicalField::SiteName).as_deref(), Some("Site1"));
        assert_eq!(resolved.get(LogicalField::Latitude), &CellValue::Number(24.7));
        assert_eq!(resolved.get(LogicalField::Longitude), &CellValue::Empty);
    }
}
