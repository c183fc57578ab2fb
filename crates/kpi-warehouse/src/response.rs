//! SQL API response bodies and their conversion into frames.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WarehouseError};

/// Error code the warehouse returns for a missing or unauthorized object.
const OBJECT_DOES_NOT_EXIST: &str = "002003";

/// Body of `POST /api/v2/statements`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatementRequest<'a> {
    pub statement: &'a str,
    pub timeout: u64,
    pub database: &'a str,
    pub schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
}

/// Any statement endpoint response: result, pending status or error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    pub sql_state: Option<String>,
    pub statement_handle: Option<String>,
    /// Present while an asynchronous statement is still running.
    pub statement_status_url: Option<String>,
    /// Only the first partition carries metadata.
    pub result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    pub data: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetMetaData {
    pub num_rows: Option<u64>,
    #[serde(default)]
    pub partition_info: Vec<PartitionInfo>,
    #[serde(default)]
    pub row_type: Vec<ColumnType>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionInfo {
    pub row_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnType {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub scale: Option<i64>,
}

impl StatementResponse {
    pub fn partition_count(&self) -> usize {
        self.result_set_meta_data
            .as_ref()
            .map_or(0, |meta| meta.partition_info.len())
    }
}

/// Map a non-success HTTP response to a structured error.
pub fn error_from_response(status: u16, body: &str) -> WarehouseError {
    let parsed: StatementResponse = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .clone()
        .unwrap_or_else(|| body.trim().to_string());
    match status {
        401 | 403 => WarehouseError::Permission { status, message },
        408 => WarehouseError::Timeout(message),
        429 | 502 | 503 | 504 => WarehouseError::Network(format!("HTTP {status}: {message}")),
        400 | 422 => match parsed.code {
            Some(code) if code == OBJECT_DOES_NOT_EXIST => WarehouseError::MissingTable { message },
            Some(code) => WarehouseError::Sql {
                code,
                sql_state: parsed.sql_state,
                message,
            },
            None => WarehouseError::Api { status, message },
        },
        _ => WarehouseError::Api { status, message },
    }
}

/// Build a frame from result rows using the declared column types.
///
/// Integer `fixed` columns become `i64`, scaled `fixed` and `real` columns
/// become `f64`; everything else stays a string.
pub fn frame_from_rows(columns: &[ColumnType], rows: &[Vec<Option<String>>]) -> Result<DataFrame> {
    let mut out = Vec::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        let cells = rows.iter().map(|row| row.get(idx).and_then(Option::as_deref));
        let series = match (column.kind.to_ascii_lowercase().as_str(), column.scale) {
            ("fixed", None | Some(0)) => {
                let values = cells
                    .map(|cell| cell.map(|v| parse_cell::<i64>(&column.name, v)).transpose())
                    .collect::<Result<Vec<Option<i64>>>>()?;
                Series::new(column.name.as_str().into(), values)
            }
            ("fixed" | "real", _) => {
                let values = cells
                    .map(|cell| cell.map(|v| parse_cell::<f64>(&column.name, v)).transpose())
                    .collect::<Result<Vec<Option<f64>>>>()?;
                Series::new(column.name.as_str().into(), values)
            }
            _ => {
                let values: Vec<Option<&str>> = cells.collect();
                Series::new(column.name.as_str().into(), values)
            }
        };
        out.push(series.into_column());
    }
    DataFrame::new(out).map_err(|e| WarehouseError::InvalidResponse(e.to_string()))
}

fn parse_cell<T: std::str::FromStr>(column: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        WarehouseError::InvalidResponse(format!(
            "column {column}: cannot parse {value:?} as a number"
        ))
    })
}
