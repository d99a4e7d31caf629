use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pg-seed")]
#[command(version, about = "Provision a PostgreSQL schema and load seed data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reset a dataset's tables, load its seed files and verify the result
    Setup {
        /// Dataset to provision
        #[arg(long, default_value = "ecommerce")]
        dataset: String,

        /// Directory containing the seed files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Customer id used by the sample verification query
        #[arg(long, default_value_t = 1)]
        sample_customer: i32,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Print the SQL a setup run would execute, without connecting
    Ddl {
        /// Dataset to describe
        #[arg(long, default_value = "ecommerce")]
        dataset: String,
    },

    /// List datasets and their tables in load order
    ListTables {
        /// Only show this dataset
        dataset: Option<String>,
    },

    /// Serve the chat UI directory over HTTP
    Serve {
        /// Directory to serve
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Use this port instead of the default candidates
        #[arg(short, long)]
        port: Option<u16>,

        /// Page to open in the browser
        #[arg(long, default_value = "chat_ui.html")]
        page: String,

        /// Do not open a browser tab
        #[arg(long)]
        no_browser: bool,
    },
}

/// Database connection flags; each falls back to the libpq variable
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    #[arg(long, env = "PGHOST")]
    pub host: Option<String>,

    #[arg(long, env = "PGPORT")]
    pub port: Option<u16>,

    #[arg(long, env = "PGDATABASE")]
    pub database: Option<String>,

    #[arg(long, env = "PGUSER")]
    pub user: Option<String>,

    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// JSON file with host, port, database, user and password
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_defaults() {
        let cli = Cli::try_parse_from(["pg-seed", "setup", "--config", "db.json"]).unwrap();
        match cli.command {
            Commands::Setup {
                dataset,
                data_dir,
                sample_customer,
                connection,
            } => {
                assert_eq!(dataset, "ecommerce");
                assert_eq!(data_dir, PathBuf::from("data"));
                assert_eq!(sample_customer, 1);
                assert_eq!(connection.config, Some(PathBuf::from("db.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from(["pg-seed", "serve", "-p", "9000", "--no-browser"]).unwrap();
        match cli.command {
            Commands::Serve {
                port, no_browser, ..
            } => {
                assert_eq!(port, Some(9000));
                assert!(no_browser);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
