use bytes::BytesMut;
use chrono::{NaiveDate, NaiveDateTime};
use postgres::types::{IsNull, ToSql, Type};
use rust_decimal::Decimal;
use std::error::Error;
use std::str::FromStr;

use crate::schema::{Column, ColumnType};

/// A typed cell ready for binding
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i32),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Boolean(bool),
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Integer(v) => v.to_sql(ty, out),
            SqlValue::Decimal(v) => v.to_sql(ty, out),
            SqlValue::Text(v) => v.to_sql(ty, out),
            SqlValue::Date(v) => v.to_sql(ty, out),
            SqlValue::Timestamp(v) => v.to_sql(ty, out),
            SqlValue::Boolean(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    // NULL binds to any column type; everything else defers to its own check
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Integer(v) => v.to_sql_checked(ty, out),
            SqlValue::Decimal(v) => v.to_sql_checked(ty, out),
            SqlValue::Text(v) => v.to_sql_checked(ty, out),
            SqlValue::Date(v) => v.to_sql_checked(ty, out),
            SqlValue::Timestamp(v) => v.to_sql_checked(ty, out),
            SqlValue::Boolean(v) => v.to_sql_checked(ty, out),
        }
    }
}

/// Rows read from one source file, with the target column for each cell
#[derive(Debug, Default)]
pub struct RowSet {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl RowSet {
    pub fn new(columns: Vec<&'static str>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Convert a raw cell into a value for `column`; empty cells are NULL
pub fn parse_value(raw: &str, column: &Column) -> Result<SqlValue, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(SqlValue::Null);
    }

    let invalid = |kind: &str| format!("invalid {} '{}' for column {}", kind, raw, column.name);

    match column.col_type {
        ColumnType::Integer | ColumnType::Serial => trimmed
            .parse::<i32>()
            .map(SqlValue::Integer)
            .map_err(|_| invalid("integer")),
        ColumnType::Decimal { .. } => Decimal::from_str(trimmed)
            .map(SqlValue::Decimal)
            .map_err(|_| invalid("decimal")),
        ColumnType::Varchar(_) | ColumnType::Text => Ok(SqlValue::Text(raw.to_string())),
        ColumnType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(SqlValue::Date)
            .map_err(|_| invalid("date")),
        ColumnType::Timestamp => parse_timestamp(trimmed)
            .map(SqlValue::Timestamp)
            .ok_or_else(|| invalid("timestamp")),
        ColumnType::Boolean => parse_bool(trimmed)
            .map(SqlValue::Boolean)
            .ok_or_else(|| invalid("boolean")),
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
