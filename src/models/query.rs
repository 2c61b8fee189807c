//! Query arguments and results.
//!
//! These are the driver-neutral shapes the capability traits speak:
//! [`QueryParam`] for positional arguments, [`CommandTag`] for `exec`,
//! [`Rows`] for `query` and [`Row`] for `query_row`.

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// A decoded row: column name to value.
pub type JsonRow = serde_json::Map<String, JsonValue>;

/// A positional argument for a parameterized statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Binary data (base64 encoded in JSON)
    #[serde(serialize_with = "base64_bytes::serialize", skip_deserializing)]
    Bytes(Vec<u8>),
    /// JSON document (objects and arrays)
    Json(JsonValue),
}

impl QueryParam {
    /// Check if this parameter is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Json(_) => "json",
        }
    }
}

impl From<bool> for QueryParam {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for QueryParam {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for QueryParam {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for QueryParam {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for QueryParam {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for QueryParam {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<JsonValue> for QueryParam {
    fn from(v: JsonValue) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<QueryParam>> From<Option<T>> for QueryParam {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Custom serialization for binary data as base64.
mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Serialize, Serializer};

    pub fn serialize<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(bytes).serialize(serializer)
    }
}

/// Outcome of a statement run through `exec`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommandTag {
    rows_affected: u64,
}

impl CommandTag {
    pub fn new(rows_affected: u64) -> Self {
        Self { rows_affected }
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} row(s) affected", self.rows_affected)
    }
}

/// A fully fetched result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rows {
    columns: Vec<String>,
    rows: Vec<JsonRow>,
}

impl Rows {
    pub fn new(columns: Vec<String>, rows: Vec<JsonRow>) -> Self {
        Self { columns, rows }
    }

    /// Column names in result order. Empty when no rows came back.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JsonRow> {
        self.rows.iter()
    }

    pub fn into_vec(self) -> Vec<JsonRow> {
        self.rows
    }
}

impl IntoIterator for Rows {
    type Item = JsonRow;
    type IntoIter = std::vec::IntoIter<JsonRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a JsonRow;
    type IntoIter = std::slice::Iter<'a, JsonRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Result of `query_row`. Any error is deferred until [`Row::scan`].
#[derive(Debug)]
pub struct Row {
    result: DbResult<JsonRow>,
}

impl Row {
    pub fn new(result: DbResult<JsonRow>) -> Self {
        Self { result }
    }

    pub fn from_error(err: DbError) -> Self {
        Self { result: Err(err) }
    }

    /// True when the row was fetched successfully.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&DbError> {
        self.result.as_ref().err()
    }

    /// Look up a single column without consuming the row.
    pub fn get(&self, column: &str) -> Option<&JsonValue> {
        self.result.as_ref().ok().and_then(|row| row.get(column))
    }

    pub fn scan(self) -> DbResult<JsonRow> {
        self.result
    }
}

impl From<DbResult<JsonRow>> for Row {
    fn from(result: DbResult<JsonRow>) -> Self {
        Self::new(result)
    }
}
