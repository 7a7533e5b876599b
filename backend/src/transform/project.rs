//! Projection of filtered rows into [`CleanRecord`]s.
//!
//! No filtering happens here. Region, status, date and coordinates were all
//! checked by the filter stages; the only invariant left for this step is a
//! non-blank site name.

use crate::error::ProjectionError;
use crate::models::CleanRecord;
use crate::resolve::LogicalField;

use super::filter::{FilteredRow, TARGET_REGION};

/// Build the output record for one surviving row.
pub fn project_record(row: &FilteredRow<'_>) -> Result<CleanRecord, ProjectionError> {
    let site_name = row
        .row
        .text(LogicalField::SiteName)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invariant(row, LogicalField::SiteName, "site name is blank"))?;

    let region = row
        .row
        .text(LogicalField::Region)
        .filter(|r| r.to_lowercase() == TARGET_REGION)
        .ok_or_else(|| invariant(row, LogicalField::Region, "region filter was bypassed"))?;

    if !(row.lat.is_finite() && row.lng.is_finite()) {
        return Err(invariant(row, LogicalField::Latitude, "coordinates are not finite"));
    }

    Ok(CleanRecord {
        site_name,
        region,
        cow_status: row.status,
        next_fueling_plan: row.date,
        lat: row.lat,
        lng: row.lng,
    })
}

fn invariant(row: &FilteredRow<'_>, field: LogicalField, message: &str) -> ProjectionError {
    ProjectionError {
        row: row.index,
        field,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellValue, CowStatus, RawRow, RawTable};
    use crate::resolve::resolve_columns;
    use crate::transform::filter::filter_rows;
    use chrono::NaiveDate;

    fn one_row_table(site: &str, region: &str) -> RawTable {
        let headers = ["SiteName", "Region", "COWStatus", "NextFuelingPlan", "lat", "lng"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = RawRow::new(vec![
            CellValue::from_field(site),
            CellValue::from_field(region),
            "On-Air".into(),
            "12-15-2025".into(),
            "24.7136".into(),
            "46.6753".into(),
        ]);
        RawTable::new(headers, vec![row])
    }

    #[test]
    fn test_project_trims_and_formats() {
        let t = one_row_table("  Site1 ", " Central ");
        let fields = resolve_columns(t.headers()).unwrap();
        let (rows, _) = filter_rows(&t, &fields);

        let record = project_record(&rows[0]).unwrap();
        assert_eq!(record.site_name, "Site1");
        assert_eq!(record.region, "Central");
        assert_eq!(record.cow_status, CowStatus::OnAir);
        assert_eq!(record.next_fueling_plan, NaiveDate::from_ymd_opt(2025, 12, 15).unwrap());
        assert_eq!(record.lat, 24.7136);
        assert_eq!(record.lng, 46.6753);
    }

    #[test]
    fn test_region_keeps_source_casing() {
        let t = one_row_table("Site1", "CENTRAL");
        let fields = resolve_columns(t.headers()).unwrap();
        let (rows, _) = filter_rows(&t, &fields);
        assert_eq!(project_record(&rows[0]).unwrap().region, "CENTRAL");
    }

    #[test]
    fn test_blank_site_name_is_rejected() {
        let t = one_row_table("   ", "Central");
        let fields = resolve_columns(t.headers()).unwrap();
        let (rows, _) = filter_rows(&t, &fields);

        let err = project_record(&rows[0]).unwrap_err();
        assert_eq!(err.row, 0);
        assert_eq!(err.field, LogicalField::SiteName);
    }

    #[test]
    fn test_numeric_site_name_renders_as_text() {
        let t = one_row_table("1042", "Central");
        let fields = resolve_columns(t.headers()).unwrap();
        let (rows, _) = filter_rows(&t, &fields);
        assert_eq!(project_record(&rows[0]).unwrap().site_name, "1042");
    }
}
