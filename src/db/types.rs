//! Row decoding for the sqlx binding.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. A per-backend decoder extracts the value for that category
//!
//! When the declared type does not decode, the stored value's own type is
//! tried, then text. A value nothing can read is a decode error.
//!
//! The decoders are generated by `impl_row_to_json!`, one per sqlx row type,
//! differing only in the integer widths each backend can decode.

use crate::models::{DatabaseType, JsonRow, Rows};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::sqlite::{SqliteRow, SqliteTypeInfo, SqliteValueRef};
use sqlx::types::Uuid;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Uuid,
    Temporal,
}

/// Classify a database type name into a logical category.
///
/// Only the leading word counts, so `BIGINT UNSIGNED`, `VARCHAR(255)` and
/// `DOUBLE PRECISION` classify by `bigint`, `varchar` and `double`.
pub fn categorize_type(type_name: &str, db: DatabaseType) -> TypeCategory {
    let lower = type_name.to_lowercase();
    let base = lower
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    match base {
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "int2" | "int4"
        | "int8" | "smallserial" | "serial" | "bigserial" | "year" => TypeCategory::Integer,
        // SQLite's NUMERIC is an affinity, not an exact type
        "numeric" if db == DatabaseType::SQLite => TypeCategory::Float,
        "decimal" | "numeric" => TypeCategory::Decimal,
        "bool" | "boolean" => TypeCategory::Boolean,
        "float" | "float4" | "float8" | "double" | "real" => TypeCategory::Float,
        "json" | "jsonb" => TypeCategory::Json,
        "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary" | "bytea" => {
            TypeCategory::Binary
        }
        "uuid" => TypeCategory::Uuid,
        "date" | "time" | "datetime" | "timestamp" | "timestamptz" => TypeCategory::Temporal,
        // varchar, text, char, enum, interval, ...
        _ => TypeCategory::Text,
    }
}

/// DECIMAL/NUMERIC value kept as its exact textual form.
#[derive(Debug)]
pub struct RawDecimal(pub String);

fn is_decimal_type(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("decimal") || name.contains("numeric")
}

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        is_decimal_type(ty.name())
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        is_decimal_type(ty.name())
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Sqlite> for RawDecimal {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<sqlx::Sqlite>>::type_info()
    }

    // SQLite stores DECIMAL columns with numeric affinity; read back as text.
    fn compatible(_ty: &SqliteTypeInfo) -> bool {
        true
    }
}

impl<'r> Decode<'r, sqlx::Sqlite> for RawDecimal {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(RawDecimal(s))
    }
}

/// Encode binary column data as base64.
pub fn encode_binary(bytes: &[u8]) -> JsonValue {
    JsonValue::String(STANDARD.encode(bytes))
}

fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn column_names(&self) -> Vec<String>;

    /// Decode every column. A non-NULL value that cannot be decoded is an
    /// error, never a silent `null`.
    fn to_json_map(&self) -> Result<JsonRow, sqlx::Error>;
}

macro_rules! impl_row_to_json {
    ($row:ty, $db_type:expr, ints = [$($int:ty),+]) => {
        impl RowToJson for $row {
            fn column_names(&self) -> Vec<String> {
                self.columns().iter().map(|c| c.name().to_string()).collect()
            }

            fn to_json_map(&self) -> Result<JsonRow, sqlx::Error> {
                self.columns()
                    .iter()
                    .enumerate()
                    .map(|(idx, col)| {
                        let value = decode_column(self, idx, col.type_info().name(), $db_type)?;
                        Ok((col.name().to_string(), value))
                    })
                    .collect()
            }
        }

        impl DecodeColumn for $row {
            fn runtime_type(&self, idx: usize) -> Result<Option<String>, sqlx::Error> {
                let raw = self.try_get_raw(idx)?;
                if raw.is_null() {
                    return Ok(None);
                }
                Ok(Some(raw.type_info().name().to_string()))
            }

            fn decode_integer(&self, idx: usize) -> Option<JsonValue> {
                $(
                    if let Ok(v) = self.try_get::<$int, _>(idx) {
                        return Some(JsonValue::Number(v.into()));
                    }
                )+
                None
            }

            fn decode_float(&self, idx: usize) -> Option<JsonValue> {
                if let Ok(v) = self.try_get::<f64, _>(idx) {
                    return Some(float_value(v));
                }
                self.try_get::<f32, _>(idx).ok().map(|v| float_value(v as f64))
            }

            fn decode_decimal(&self, idx: usize) -> Option<JsonValue> {
                self.try_get::<RawDecimal, _>(idx)
                    .ok()
                    .map(|v| JsonValue::String(v.0))
            }

            fn decode_boolean(&self, idx: usize) -> Option<JsonValue> {
                self.try_get::<bool, _>(idx).ok().map(JsonValue::Bool)
            }

            fn decode_binary(&self, idx: usize) -> Option<JsonValue> {
                self.try_get::<Vec<u8>, _>(idx).ok().map(|v| encode_binary(&v))
            }

            fn decode_json(&self, idx: usize) -> Option<JsonValue> {
                if let Ok(v) = self.try_get::<JsonValue, _>(idx) {
                    return Some(v);
                }
                self.decode_text(idx, "json")
            }

            fn decode_uuid(&self, idx: usize) -> Option<JsonValue> {
                if let Ok(v) = self.try_get::<Uuid, _>(idx) {
                    return Some(JsonValue::String(v.to_string()));
                }
                self.decode_text(idx, "uuid")
            }

            fn decode_temporal(&self, idx: usize) -> Option<JsonValue> {
                if let Ok(v) = self.try_get::<DateTime<Utc>, _>(idx) {
                    return Some(JsonValue::String(v.to_rfc3339()));
                }
                if let Ok(v) = self.try_get::<NaiveDateTime, _>(idx) {
                    return Some(JsonValue::String(
                        v.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
                    ));
                }
                if let Ok(v) = self.try_get::<NaiveDate, _>(idx) {
                    return Some(JsonValue::String(v.to_string()));
                }
                if let Ok(v) = self.try_get::<NaiveTime, _>(idx) {
                    return Some(JsonValue::String(v.to_string()));
                }
                self.decode_text(idx, "time")
            }

            fn decode_text(&self, idx: usize, type_name: &str) -> Option<JsonValue> {
                let v = self.try_get::<String, _>(idx).ok()?;
                if type_name.to_lowercase().contains("json") {
                    if let Ok(json) = serde_json::from_str::<JsonValue>(&v) {
                        return Some(json);
                    }
                }
                Some(JsonValue::String(v))
            }

            fn text_error(&self, idx: usize) -> sqlx::Error {
                match self.try_get::<String, _>(idx) {
                    Err(e) => e,
                    Ok(_) => sqlx::Error::ColumnDecode {
                        index: idx.to_string(),
                        source: "value matched no decoder".into(),
                    },
                }
            }
        }
    };
}

/// Per-backend decoders. Each returns `None` when the value cannot be read
/// as that category; NULLs are handled before any of them run.
trait DecodeColumn {
    /// Type of the stored value, or `None` for NULL.
    fn runtime_type(&self, idx: usize) -> Result<Option<String>, sqlx::Error>;
    fn decode_integer(&self, idx: usize) -> Option<JsonValue>;
    fn decode_float(&self, idx: usize) -> Option<JsonValue>;
    fn decode_decimal(&self, idx: usize) -> Option<JsonValue>;
    fn decode_boolean(&self, idx: usize) -> Option<JsonValue>;
    fn decode_binary(&self, idx: usize) -> Option<JsonValue>;
    fn decode_json(&self, idx: usize) -> Option<JsonValue>;
    fn decode_uuid(&self, idx: usize) -> Option<JsonValue>;
    fn decode_temporal(&self, idx: usize) -> Option<JsonValue>;
    fn decode_text(&self, idx: usize, type_name: &str) -> Option<JsonValue>;
    fn text_error(&self, idx: usize) -> sqlx::Error;

    fn decode_as(&self, idx: usize, type_name: &str, category: TypeCategory) -> Option<JsonValue> {
        match category {
            TypeCategory::Integer => self.decode_integer(idx),
            TypeCategory::Float => self.decode_float(idx),
            TypeCategory::Decimal => self.decode_decimal(idx),
            TypeCategory::Boolean => self.decode_boolean(idx),
            TypeCategory::Binary => self.decode_binary(idx),
            TypeCategory::Json => self.decode_json(idx),
            TypeCategory::Uuid => self.decode_uuid(idx),
            TypeCategory::Temporal => self.decode_temporal(idx),
            TypeCategory::Text => self.decode_text(idx, type_name),
        }
    }
}

/// Decode one column: by its declared type, then by the stored value's own
/// type (SQLite values need not match their column), then as text.
fn decode_column<R: DecodeColumn>(
    row: &R,
    idx: usize,
    declared: &str,
    db: DatabaseType,
) -> Result<JsonValue, sqlx::Error> {
    let Some(runtime) = row.runtime_type(idx)? else {
        return Ok(JsonValue::Null);
    };

    let category = categorize_type(declared, db);
    if let Some(v) = row.decode_as(idx, declared, category) {
        return Ok(v);
    }

    let runtime_category = categorize_type(&runtime, db);
    if runtime_category != category {
        if let Some(v) = row.decode_as(idx, &runtime, runtime_category) {
            return Ok(v);
        }
    }

    tracing::debug!(
        column = idx,
        declared = %declared,
        runtime = %runtime,
        "Falling back to text decode"
    );
    row.decode_text(idx, &runtime)
        .ok_or_else(|| row.text_error(idx))
}

impl_row_to_json!(
    MySqlRow,
    DatabaseType::MySQL,
    ints = [i64, u64, i32, u32, i16, u16, i8, u8]
);
impl_row_to_json!(PgRow, DatabaseType::PostgreSQL, ints = [i64, i32, i16]);
impl_row_to_json!(SqliteRow, DatabaseType::SQLite, ints = [i64, i32]);

/// Collect fetched rows into a [`Rows`] result set.
pub(crate) fn collect_rows<R: RowToJson>(rows: Vec<R>) -> Result<Rows, sqlx::Error> {
    let columns = rows.first().map(RowToJson::column_names).unwrap_or_default();
    let rows = rows
        .iter()
        .map(RowToJson::to_json_map)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Rows::new(columns, rows))
}
