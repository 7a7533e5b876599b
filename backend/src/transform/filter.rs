//! Row filter stages.
//!
//! Rows go through four stages, always in this order, each seeing only the
//! survivors of the previous one:
//!
//! ```text
//! region == central → status ∈ {ON-AIR, IN PROGRESS} → valid date → finite lat/lng
//! ```
//!
//! Values parsed by a stage (status, date, coordinates) are carried forward,
//! never re-parsed. Dropped rows are not errors; each stage only records how
//! many rows it saw and kept.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{CowStatus, RawTable};
use crate::normalize::analyze_date;
use crate::resolve::{FieldMap, LogicalField, ResolvedRow};

/// Region kept on the dashboard (compared case-insensitively).
pub const TARGET_REGION: &str = "central";

/// One filter stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    Region,
    Status,
    Date,
    Coordinates,
}

impl FilterStage {
    pub const ORDER: [FilterStage; 4] = [
        FilterStage::Region,
        FilterStage::Status,
        FilterStage::Date,
        FilterStage::Coordinates,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Status => "status",
            Self::Date => "fueling date",
            Self::Coordinates => "coordinates",
        }
    }
}

/// Row counts around one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: FilterStage,
    pub before: usize,
    pub after: usize,
    pub removed: usize,
}

/// Diagnostics of one filtering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterReport {
    pub input_rows: usize,
    pub stages: Vec<StageCount>,
    /// Kept rows whose date reads differently with day and month swapped.
    pub ambiguous_dates: usize,
    /// Rows that passed every stage but could not be projected.
    pub rejected: usize,
}

impl FilterReport {
    /// Report of a pass over no rows: every stage present, all counts zero.
    pub fn empty() -> Self {
        Self {
            stages: FilterStage::ORDER
                .iter()
                .map(|&stage| StageCount {
                    stage,
                    before: 0,
                    after: 0,
                    removed: 0,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn stage(&self, stage: FilterStage) -> Option<&StageCount> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Rows left after the last stage.
    pub fn surviving_rows(&self) -> usize {
        self.stages.last().map(|s| s.after).unwrap_or(self.input_rows)
    }

    pub fn summary(&self) -> String {
        let stages: Vec<String> = self
            .stages
            .iter()
            .map(|s| format!("{} -{}", s.stage.label(), s.removed))
            .collect();
        format!(
            "{} rows in, {} kept ({})",
            self.input_rows,
            self.surviving_rows(),
            stages.join(", ")
        )
    }

    fn run_stage<T, U>(
        &mut self,
        stage: FilterStage,
        rows: Vec<T>,
        keep: impl FnMut(T) -> Option<U>,
    ) -> Vec<U> {
        let before = rows.len();
        let kept: Vec<U> = rows.into_iter().filter_map(keep).collect();
        self.stages.push(StageCount {
            stage,
            before,
            after: kept.len(),
            removed: before - kept.len(),
        });
        kept
    }
}

/// A row that passed every stage, with the values the stages parsed.
#[derive(Debug, Clone, Copy)]
pub struct FilteredRow<'a> {
    /// Zero-based data row index in the source table.
    pub index: usize,
    pub row: ResolvedRow<'a>,
    pub status: CowStatus,
    pub date: NaiveDate,
    pub ambiguous_date: bool,
    pub lat: f64,
    pub lng: f64,
}

/// Run all four stages over `table`.
pub fn filter_rows<'a>(
    table: &'a RawTable,
    fields: &'a FieldMap,
) -> (Vec<FilteredRow<'a>>, FilterReport) {
    let mut report = FilterReport {
        input_rows: table.len(),
        ..FilterReport::default()
    };

    let rows: Vec<(usize, ResolvedRow<'a>)> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| (i, ResolvedRow::new(row, fields)))
        .collect();

    let rows = report.run_stage(FilterStage::Region, rows, |(i, row)| {
        is_target_region(&row).then_some((i, row))
    });

    let rows = report.run_stage(FilterStage::Status, rows, |(i, row)| {
        let status = row
            .text(LogicalField::Status)
            .and_then(|s| CowStatus::from_label(&s))?;
        Some((i, row, status))
    });

    let rows = report.run_stage(FilterStage::Date, rows, |(i, row, status)| {
        let date = analyze_date(row.get(LogicalField::FuelingPlan))?;
        Some((i, row, status, date))
    });

    let rows = report.run_stage(FilterStage::Coordinates, rows, |(index, row, status, date)| {
        let lat = row.get(LogicalField::Latitude).as_finite_f64()?;
        let lng = row.get(LogicalField::Longitude).as_finite_f64()?;
        Some(FilteredRow {
            index,
            row,
            status,
            date: date.date,
            ambiguous_date: date.ambiguous,
            lat,
            lng,
        })
    });

    report.ambiguous_dates = rows.iter().filter(|r| r.ambiguous_date).count();
    (rows, report)
}

fn is_target_region(row: &ResolvedRow<'_>) -> bool {
    row.text(LogicalField::Region)
        .map(|r| r.to_lowercase() == TARGET_REGION)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellValue, RawRow};
    use crate::resolve::resolve_columns;

    fn table(rows: Vec<Vec<CellValue>>) -> RawTable {
        let headers = ["SiteName", "Region", "COWStatus", "NextFuelingPlan", "lat", "lng"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        RawTable::new(headers, rows.into_iter().map(RawRow::new).collect())
    }

    fn row(site: &str, region: &str, status: &str, date: CellValue, lat: &str, lng: &str) -> Vec<CellValue> {
        vec![
            CellValue::from_field(site),
            CellValue::from_field(region),
            CellValue::from_field(status),
            date,
            CellValue::from_field(lat),
            CellValue::from_field(lng),
        ]
    }

    fn date(s: &str) -> CellValue {
        CellValue::from_field(s)
    }

    #[test]
    fn test_stages_run_in_order_and_count() {
        let t = table(vec![
            row("S1", "Central", "On-Air", date("12-15-2025"), "24.7", "46.6"),
            row("S2", "North", "ON-AIR", date("12-15-2025"), "24.7", "46.6"),
            row("S3", " central ", "OFF-AIR", date("12-15-2025"), "24.7", "46.6"),
            row("S4", "CENTRAL", "in progress", date("#N/A"), "24.7", "46.6"),
            row("S5", "Central", "IN PROGRESS", date("2025-01-02"), "abc", "46.6"),
            row("S6", "Central", " in progress ", date("45640"), "24.1", "46.1"),
        ]);
        let fields = resolve_columns(t.headers()).unwrap();
        let (rows, report) = filter_rows(&t, &fields);

        let counts: Vec<(usize, usize, usize)> =
            report.stages.iter().map(|s| (s.before, s.after, s.removed)).collect();
        assert_eq!(counts, vec![(6, 5, 1), (5, 4, 1), (4, 3, 1), (3, 2, 1)]);
        assert_eq!(
            report.stages.iter().map(|s| s.stage).collect::<Vec<_>>(),
            FilterStage::ORDER.to_vec()
        );

        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 5]);
        assert_eq!(rows[1].status, CowStatus::InProgress);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 12, 14).unwrap());
        assert_eq!(report.surviving_rows(), 2);
    }

    #[test]
    fn test_counts_never_increase() {
        let t = table(vec![
            row("S1", "Central", "On-Air", date("12-15-2025"), "24.7", "46.6"),
            row("S2", "", "", CellValue::Empty, "", ""),
            row("S3", "Central", "ON-AIR", date("N/A"), "", "46.6"),
        ]);
        let fields = resolve_columns(t.headers()).unwrap();
        let (_, report) = filter_rows(&t, &fields);

        let mut previous = report.input_rows;
        for stage in &report.stages {
            assert_eq!(stage.before, previous);
            assert!(stage.after <= stage.before);
            assert_eq!(stage.removed, stage.before - stage.after);
            previous = stage.after;
        }
    }

    #[test]
    fn test_missing_coordinates_are_dropped() {
        let t = table(vec![
            row("S1", "Central", "On-Air", date("12-15-2025"), "", "46.6"),
            row("S2", "Central", "On-Air", date("12-15-2025"), "24.7", "inf"),
            row("S3", "Central", "On-Air", date("12-15-2025"), " 24.7 ", "46.6"),
        ]);
        let fields = resolve_columns(t.headers()).unwrap();
        let (rows, report) = filter_rows(&t, &fields);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lat, 24.7);
        assert_eq!(report.stage(FilterStage::Coordinates).unwrap().removed, 2);
    }

    #[test]
    fn test_ambiguous_dates_are_counted_not_dropped() {
        let t = table(vec![
            row("S1", "Central", "On-Air", date("03-04-2025"), "24.7", "46.6"),
            row("S2", "Central", "On-Air", date("12-15-2025"), "24.7", "46.6"),
        ]);
        let fields = resolve_columns(t.headers()).unwrap();
        let (rows, report) = filter_rows(&t, &fields);
        assert_eq!(rows.len(), 2);
        assert_eq!(report.ambiguous_dates, 1);
    }

    #[test]
    fn test_empty_table() {
        let t = table(vec![]);
        let fields = resolve_columns(t.headers()).unwrap();
        let (rows, report) = filter_rows(&t, &fields);
        assert!(rows.is_empty());
        assert_eq!(report.stages.len(), 4);
        assert!(report.stages.iter().all(|s| s.before == 0 && s.after == 0));
    }
}
