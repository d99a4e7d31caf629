pub mod delimited;
pub mod record;
pub mod sheet;

pub use delimited::read_csv;
pub use record::{parse_value, RowSet, SqlValue};
pub use sheet::read_sheet;

use std::path::Path;

use crate::error::Result;
use crate::schema::{Source, SourceFormat, TableSchema};

/// Read the full contents of a table's seed file into memory
pub fn read_source(path: &Path, schema: &TableSchema, source: &Source) -> Result<RowSet> {
    match source.format {
        SourceFormat::Csv => read_csv(path, schema),
        SourceFormat::Sheet { columns } => read_sheet(path, schema, columns),
    }
}
