//! SQL statement execution through the SQL REST API.
//!
//! API: `POST /api/v2/statements`. Values are always sent as positional
//! bindings; only identifiers validated by the config layer are ever
//! interpolated into statement text.

use crate::client::PlatformClient;
use assist_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STATEMENTS_PATH: &str = "/api/v2/statements";

/// A positional bind value.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Binding {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Binding {
    /// A `TEXT` binding.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "TEXT".to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    bindings: BTreeMap<String, Binding>,
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(rename = "resultSetMetaData")]
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
    #[serde(rename = "statementHandle")]
    statement_handle: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultSetMetaData {
    #[serde(rename = "rowType", default)]
    row_type: Vec<ColumnType>,
}

#[derive(Debug, Deserialize)]
struct ColumnType {
    name: String,
}

/// Rows returned by a statement. Cells are the API's string renderings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Cell value by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// First cell of the first row.
    pub fn first_value(&self) -> Option<&str> {
        self.rows.first()?.first()?.as_deref()
    }

    /// Render as a pipe-separated text table for embedding into prompts.
    pub fn to_table_string(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }

        let mut out = self.columns.join(" | ");
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<&str> = row
                .iter()
                .map(|cell| cell.as_deref().unwrap_or("NULL"))
                .collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
        out
    }
}

impl PlatformClient {
    /// Execute a statement with positional bindings and return its rows.
    ///
    /// Only the first result partition is read. A statement that is still
    /// running when the API answers (HTTP 202) is reported as an error.
    pub async fn execute(&self, sql: &str, bindings: &[Binding]) -> AppResult<ResultSet> {
        let settings = self.settings();
        let request = StatementRequest {
            statement: sql,
            timeout: settings.timeout.as_secs(),
            database: Some(&settings.database),
            schema: Some(&settings.schema),
            warehouse: settings.warehouse.as_deref(),
            role: settings.role.as_deref(),
            bindings: bindings
                .iter()
                .enumerate()
                .map(|(i, b)| ((i + 1).to_string(), b.clone()))
                .collect(),
        };

        tracing::debug!("Executing statement: {}", sql.trim());

        let response = self
            .post_json(STATEMENTS_PATH, &request)
            .await
            .map_err(|e| AppError::Sql(e.to_string()))?;

        let accepted = response.status() == reqwest::StatusCode::ACCEPTED;

        let body: StatementResponse = response
            .json()
            .await
            .map_err(|e| AppError::Sql(format!("Failed to parse statement response: {}", e)))?;

        if accepted {
            return Err(AppError::Sql(format!(
                "Statement {} is still running: {}",
                body.statement_handle.as_deref().unwrap_or("<unknown>"),
                body.message.as_deref().unwrap_or("no message")
            )));
        }

        let columns = body
            .result_set_meta_data
            .map(|m| m.row_type.into_iter().map(|c| c.name).collect())
            .unwrap_or_default();

        tracing::debug!("Statement returned {} rows", body.data.len());

        Ok(ResultSet {
            columns,
            rows: body.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        ResultSet {
            columns: vec!["MEMBER_ID".to_string(), "NAME".to_string()],
            rows: vec![
                vec![Some("M1".to_string()), Some("Ana Ruiz".to_string())],
                vec![Some("M2".to_string()), None],
            ],
        }
    }

    #[test]
    fn test_value_lookup_is_case_insensitive() {
        let rs = sample();
        assert_eq!(rs.value(0, "name"), Some("Ana Ruiz"));
        assert_eq!(rs.value(1, "NAME"), None);
        assert_eq!(rs.value(5, "NAME"), None);
        assert_eq!(rs.value(0, "missing"), None);
    }

    #[test]
    fn test_first_value() {
        assert_eq!(sample().first_value(), Some("M1"));
        assert_eq!(ResultSet::default().first_value(), None);
    }

    #[test]
    fn test_table_string_renders_nulls() {
        let table = sample().to_table_string();
        assert_eq!(table, "MEMBER_ID | NAME\nM1 | Ana Ruiz\nM2 | NULL\n");
    }

    #[test]
    fn test_bindings_serialize_positionally() {
        let request = StatementRequest {
            statement: "SELECT ?",
            timeout: 30,
            database: None,
            schema: None,
            warehouse: None,
            role: None,
            bindings: [("1".to_string(), Binding::text("x"))].into_iter().collect(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["bindings"]["1"]["type"], "TEXT");
        assert_eq!(json["bindings"]["1"]["value"], "x");
        assert!(json.get("database").is_none());
    }
}
