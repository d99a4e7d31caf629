use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = SetupError> = std::result::Result<T, E>;

/// Failures that abort a setup run
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not connect to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: postgres::Error,
    },

    #[error("failed to reset table {table}: {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: postgres::Error,
    },

    #[error("source file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to parse {}{}: {message}", .path.display(), .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    #[error("failed to load data into {table}: {source}")]
    Load {
        table: &'static str,
        #[source]
        source: postgres::Error,
    },

    #[error("transaction failed: {source}")]
    Transaction {
        #[source]
        source: postgres::Error,
    },

    #[error("verification query failed: {source}")]
    Query {
        #[source]
        source: postgres::Error,
    },

    #[error("dependency error: {0}")]
    Dependency(String),

    #[error("failed to commit: {source}")]
    Commit {
        #[source]
        source: postgres::Error,
    },
}

impl SetupError {
    pub(crate) fn parse(path: impl Into<PathBuf>, line: Option<u64>, message: impl Into<String>) -> Self {
        SetupError::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_includes_line() {
        let err = SetupError::parse("data/orders.csv", Some(4), "invalid date 'soon'");
        assert_eq!(
            err.to_string(),
            "failed to parse data/orders.csv (line 4): invalid date 'soon'"
        );

        let err = SetupError::parse("labels.xlsx", None, "workbook has no worksheets");
        assert_eq!(err.to_string(), "failed to parse labels.xlsx: workbook has no worksheets");
    }

    fn refused_connection() -> postgres::Error {
        // Nothing listens on port 1
        postgres::Config::new()
            .host("127.0.0.1")
            .port(1)
            .user("postgres")
            .connect(postgres::NoTls)
            .err()
            .expect("connection to port 1 should be refused")
    }

    #[test]
    fn test_schema_error_covers_drop_and_create() {
        let err = SetupError::Schema {
            table: "orders",
            source: refused_connection(),
        };
        assert!(err.to_string().starts_with("failed to reset table orders: "));
    }

    #[test]
    fn test_transaction_error_is_not_a_query_error() {
        let err = SetupError::Transaction {
            source: refused_connection(),
        };
        let message = err.to_string();
        assert!(message.starts_with("transaction failed: "));
        assert!(!message.contains("verification"));
    }

    #[test]
    fn test_file_not_found_message() {
        let err = SetupError::FileNotFound {
            path: PathBuf::from("data/products.csv"),
        };
        assert_eq!(err.to_string(), "source file not found: data/products.csv");
    }
}
