//! REST API types.
//!
//! Records are returned in the exact shape written to `data.json`, so the
//! dashboard can load either one.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{PipelineError, ServerError};
use crate::models::CleanRecord;
use crate::parser::CsvInfo;
use crate::transform::{CleanOutput, FilterReport};

/// Response sent after cleaning an uploaded sheet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready", or "empty" when no site passed the filters
    pub status: String,

    pub records: Vec<CleanRecord>,

    /// Per-stage row counts
    pub report: FilterReport,

    pub csv_info: CsvInfo,
}

impl CleanResponse {
    pub fn new(csv_info: CsvInfo, output: CleanOutput) -> Self {
        let status = if output.records.is_empty() { "empty" } else { "ready" };
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            records: output.records,
            report: output.report,
            csv_info,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "records": []
    })
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Csv(_))
            | ServerError::Pipeline(PipelineError::Resolve(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(error_response(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CsvError, ResolveError, ValidationError};
    use crate::resolve::LogicalField;

    fn info() -> CsvInfo {
        CsvInfo {
            encoding: "utf-8".into(),
            delimiter: ",".into(),
            headers: vec!["SiteName".into()],
            row_count: 0,
        }
    }

    #[test]
    fn test_empty_output_status() {
        let output = CleanOutput {
            records: Vec::new(),
            report: FilterReport::empty(),
            fields: None,
        };
        let response = CleanResponse::new(info(), output);
        assert_eq!(response.status, "empty");

        let value = serde_json::to_value(&response).unwrap();
        assert!(value["jobId"].is_string());
        assert_eq!(value["records"], json!([]));
        assert_eq!(value["csvInfo"]["rowCount"], 0);
        assert_eq!(value["report"]["stages"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServerError::BadRequest("no file".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(PipelineError::from(CsvError::EmptyFile)).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let drift = ResolveError::MissingFields {
            missing: vec![LogicalField::Latitude],
            available: vec!["sitename".into()],
        };
        assert_eq!(
            ServerError::from(PipelineError::from(drift)).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let invalid = ValidationError::SchemaError {
            index: 0,
            errors: vec!["bad".into()],
        };
        assert_eq!(
            ServerError::from(PipelineError::from(invalid)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_shape() {
        let value = error_response("boom");
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "boom");
        assert_eq!(value["records"], json!([]));
    }
}
