use std::fmt;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    /// Auto-incrementing integer key
    Serial,
    Varchar(u16),
    Text,
    /// Fixed-point NUMERIC(precision, scale)
    Decimal { precision: u8, scale: u8 },
    Date,
    Timestamp,
    Boolean,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Serial => write!(f, "SERIAL"),
            ColumnType::Varchar(len) => write!(f, "VARCHAR({})", len),
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::Decimal { precision, scale } => {
                write!(f, "DECIMAL({}, {})", precision, scale)
            }
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::Timestamp => write!(f, "TIMESTAMP"),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// Column definition
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    /// SQL expression used as the column default
    pub default: Option<&'static str>,
    /// Boolean SQL expression for a CHECK constraint
    pub check: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
            check: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            nullable: false,
            ..Self::new(name, col_type)
        }
    }

    /// Create the table's primary key column
    pub const fn key(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            primary_key: true,
            ..Self::required(name, col_type)
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn default(self, expr: &'static str) -> Self {
        Self {
            default: Some(expr),
            ..self
        }
    }

    pub const fn check(self, expr: &'static str) -> Self {
        Self {
            check: Some(expr),
            ..self
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    /// Reference a parent key column with the same name as `column`
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: column,
        }
    }

    /// Override the referenced parent column
    pub const fn references(self, column: &'static str) -> Self {
        Self {
            references_column: column,
            ..self
        }
    }
}

/// Index definition
#[derive(Debug, Clone, Copy)]
pub struct Index {
    pub columns: &'static [&'static str],
}

impl Index {
    pub const fn on(columns: &'static [&'static str]) -> Self {
        Self { columns }
    }
}

/// Layout of a table's seed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// CSV with a header row naming table columns
    Csv,
    /// First worksheet of a spreadsheet; the header row is skipped and
    /// cells are mapped positionally onto `columns`
    Sheet { columns: &'static [&'static str] },
}

/// Seed file for a table, relative to the data directory
#[derive(Debug, Clone, Copy)]
pub struct Source {
    pub file: &'static str,
    pub format: SourceFormat,
}

impl Source {
    pub const fn csv(file: &'static str) -> Self {
        Self {
            file,
            format: SourceFormat::Csv,
        }
    }

    pub const fn sheet(file: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            file,
            format: SourceFormat::Sheet { columns },
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    /// Seed file; tables without one are created but left empty
    pub source: Option<Source>,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
    pub indexes: &'static [Index],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// How the provisioner treats tables that already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Drop children before parents, then recreate everything
    Recreate,
    /// Leave existing tables and indexes untouched
    CreateIfMissing,
}

/// Diagnostic query run after loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleQuery {
    /// Orders of one customer with their item counts
    CustomerOrders,
}

/// A named set of tables provisioned and loaded together
#[derive(Debug)]
pub struct Dataset {
    pub name: &'static str,
    pub description: &'static str,
    pub tables: &'static [&'static TableSchema],
    pub reset: ResetMode,
    pub sample: Option<SampleQuery>,
}

impl Dataset {
    pub fn table(&self, name: &str) -> Option<&'static TableSchema> {
        self.tables.iter().find(|t| t.name == name).copied()
    }
}
