use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

use super::record::{parse_value, RowSet};
use crate::error::{Result, SetupError};
use crate::schema::{Column, TableSchema};

/// Read a CSV file whose header names columns of `schema`
pub fn read_csv(path: &Path, schema: &TableSchema) -> Result<RowSet> {
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;
    read_csv_from(reader, path, schema)
}

pub(crate) fn read_csv_from<R: Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
    schema: &TableSchema,
) -> Result<RowSet> {
    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    let columns = resolve_header(&headers, path, schema)?;

    let mut rows = RowSet::new(columns.iter().map(|c| c.name).collect());

    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let line = record.position().map(|p| p.line());

        let row = record
            .iter()
            .zip(&columns)
            .map(|(raw, column)| parse_value(raw, column))
            .collect::<Result<Vec<_>, String>>()
            .map_err(|message| SetupError::parse(path, line, message))?;

        rows.rows.push(row);
    }

    Ok(rows)
}

/// Map header names onto schema columns
fn resolve_header(
    headers: &csv::StringRecord,
    path: &Path,
    schema: &TableSchema,
) -> Result<Vec<&'static Column>> {
    let mut columns: Vec<&'static Column> = Vec::with_capacity(headers.len());

    for name in headers.iter() {
        let name = name.trim();
        let column = schema.column(name).ok_or_else(|| {
            SetupError::parse(
                path,
                Some(1),
                format!("column '{}' does not exist in table {}", name, schema.name),
            )
        })?;

        if columns.iter().any(|c| c.name == column.name) {
            return Err(SetupError::parse(
                path,
                Some(1),
                format!("column '{}' appears more than once", name),
            ));
        }
        columns.push(column);
    }

    if columns.is_empty() {
        return Err(SetupError::parse(path, Some(1), "missing header row"));
    }

    Ok(columns)
}

fn csv_error(path: &Path, err: csv::Error) -> SetupError {
    if let csv::ErrorKind::Io(io) = err.kind() {
        if io.kind() == std::io::ErrorKind::NotFound {
            return SetupError::FileNotFound {
                path: path.to_path_buf(),
            };
        }
    }
    let line = err.position().map(|p| p.line());
    SetupError::parse(path, line, err.to_string())
}
