use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

use super::record::{parse_value, RowSet};
use crate::error::{Result, SetupError};
use crate::schema::{Column, TableSchema};

/// Read the first worksheet of a spreadsheet, mapping columns A, B, ...
/// onto `columns` and skipping the header row
pub fn read_sheet(path: &Path, schema: &TableSchema, columns: &[&'static str]) -> Result<RowSet> {
    if !path.exists() {
        return Err(SetupError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| SetupError::parse(path, None, e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SetupError::parse(path, None, "workbook has no worksheets"))?
        .map_err(|e| SetupError::parse(path, None, e.to_string()))?;

    rows_from_range(&range, path, schema, columns)
}

/// Rows with any empty mapped cell are skipped
pub(crate) fn rows_from_range(
    range: &Range<Data>,
    path: &Path,
    schema: &TableSchema,
    columns: &[&'static str],
) -> Result<RowSet> {
    let targets = columns
        .iter()
        .map(|name| {
            schema.column(name).ok_or_else(|| {
                SetupError::parse(
                    path,
                    None,
                    format!("column '{}' does not exist in table {}", name, schema.name),
                )
            })
        })
        .collect::<Result<Vec<&'static Column>>>()?;

    let mut rows = RowSet::new(columns.to_vec());

    // The range starts at the first used cell, not at A1
    let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) else {
        return Ok(rows);
    };

    // Absolute row 0 is the header
    for row in first_row.max(1)..=last_row {
        let line = Some(u64::from(row) + 1);
        let texts: Vec<Option<String>> = (0..targets.len() as u32)
            .map(|col| range.get_value((row, col)).and_then(cell_text))
            .collect();

        if texts.iter().any(Option::is_none) {
            continue;
        }

        let values = texts
            .iter()
            .zip(&targets)
            .map(|(text, column)| parse_value(text.as_deref().unwrap_or_default(), column))
            .collect::<Result<Vec<_>, String>>()
            .map_err(|message| SetupError::parse(path, line, message))?;

        rows.rows.push(values);
    }

    Ok(rows)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SqlValue;
    use crate::schema::tables::{READ_ARTICLES, SENDER_LABEL_MAPPING};
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    const LABEL_COLUMNS: &[&str] = &["gmail_label", "pattern"];

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    /// Range covering rows `first..=last` and columns A..=B
    fn sheet(first: u32, last: u32, cells: &[(u32, u32, Data)]) -> Range<Data> {
        let mut range = Range::new((first, 0), (last, 1));
        for (row, col, value) in cells {
            range.set_value((*row, *col), value.clone());
        }
        range
    }

    fn label_rows(range: &Range<Data>) -> Result<RowSet> {
        rows_from_range(range, Path::new("labels.xlsx"), &SENDER_LABEL_MAPPING, LABEL_COLUMNS)
    }

    /// Write `cells` (row, col, text) to the first worksheet of a new workbook
    fn write_workbook(dir: &TempDir, cells: &[(u32, u16, &str)]) -> std::path::PathBuf {
        let path = dir.path().join("email_labels.xlsx");
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (row, col, value) in cells {
            worksheet.write_string(*row, *col, *value).unwrap();
        }
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_label_rows_skip_header_and_blanks() {
        let range = sheet(
            0,
            4,
            &[
                (0, 0, text("Label")),
                (0, 1, text("Pattern")),
                (1, 0, text("Receipts")),
                (1, 1, text("@shop.example.com")),
                (2, 0, text("Newsletters")),
                (3, 0, text("  ")),
                (3, 1, text("@news.example.com")),
                (4, 0, text("Travel")),
                (4, 1, text("@airline.example")),
            ],
        );
        let rows = label_rows(&range).unwrap();

        assert_eq!(rows.columns, vec!["gmail_label", "pattern"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0][0], SqlValue::Text("Receipts".to_string()));
        assert_eq!(rows.rows[1][1], SqlValue::Text("@airline.example".to_string()));
    }

    #[test]
    fn test_blank_header_row_keeps_first_data_row() {
        // Row 1 is empty, so the used range starts on row 2
        let range = sheet(
            1,
            2,
            &[
                (1, 0, text("Receipts")),
                (1, 1, text("@shop.example.com")),
                (2, 0, text("Travel")),
                (2, 1, text("@airline.example")),
            ],
        );
        let rows = label_rows(&range).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0][0], SqlValue::Text("Receipts".to_string()));
    }

    #[test]
    fn test_columns_are_mapped_from_column_a() {
        // Nothing in column A: every row is missing its label
        let mut range = Range::new((1, 1), (2, 1));
        range.set_value((1, 1), text("@shop.example.com"));
        range.set_value((2, 1), text("@airline.example"));
        assert!(label_rows(&range).unwrap().is_empty());
    }

    #[test]
    fn test_bad_value_reports_sheet_row() {
        let mut range = Range::new((2, 0), (2, 1));
        range.set_value((2, 0), text("Reading"));
        range.set_value((2, 1), text("maybe"));
        let err = rows_from_range(
            &range,
            Path::new("articles.xlsx"),
            &READ_ARTICLES,
            &["title", "is_read"],
        )
        .unwrap_err();
        match err {
            SetupError::Parse { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_target_column() {
        let range = Range::<Data>::empty();
        let err = rows_from_range(
            &range,
            Path::new("labels.xlsx"),
            &SENDER_LABEL_MAPPING,
            &["label", "pattern"],
        )
        .unwrap_err();
        assert!(err.to_string().contains("'label' does not exist"));
    }

    #[test]
    fn test_read_workbook_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = write_workbook(
            &dir,
            &[
                (0, 0, "Label"),
                (0, 1, "Pattern"),
                (1, 0, "Receipts"),
                (1, 1, "@shop.example.com"),
                (2, 0, "Travel"),
                (2, 1, "@airline.example"),
            ],
        );

        let rows = read_sheet(&path, &SENDER_LABEL_MAPPING, LABEL_COLUMNS).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[1][0], SqlValue::Text("Travel".to_string()));
    }

    #[test]
    fn test_read_workbook_without_header_row() {
        let dir = TempDir::new().unwrap();
        let path = write_workbook(
            &dir,
            &[
                (1, 0, "Receipts"),
                (1, 1, "@shop.example.com"),
                (2, 0, "Travel"),
                (2, 1, "@airline.example"),
            ],
        );

        let rows = read_sheet(&path, &SENDER_LABEL_MAPPING, LABEL_COLUMNS).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0][0], SqlValue::Text("Receipts".to_string()));
        assert_eq!(rows.rows[0][1], SqlValue::Text("@shop.example.com".to_string()));
    }

    #[test]
    fn test_missing_workbook() {
        let err = read_sheet(
            Path::new("/nonexistent/email_labels.xlsx"),
            &SENDER_LABEL_MAPPING,
            LABEL_COLUMNS,
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::FileNotFound { .. }));
    }
}
