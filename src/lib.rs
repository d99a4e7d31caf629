pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod schema;
pub mod server;
pub mod ui;
pub mod verify;
pub mod writer;

pub use cli::{Cli, Commands};
pub use config::DbConfig;
pub use error::{Result, SetupError};
pub use pipeline::{run_setup, SetupOptions, SetupSummary};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui};
