//! Console reporting for the setup pipeline
//!
//! Provides a simple API for displaying run state:
//! - Current phase (Connected, SchemaReset, DataLoaded, ...)
//! - Progress of the table being loaded
//! - Status lines with success/failure markers

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

/// Pipeline phases, in the order a successful run visits them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Connected,
    SchemaReset,
    DataLoaded,
    Verified,
    Closed,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Preparing"),
            Phase::Connected => write!(f, "Connected"),
            Phase::SchemaReset => write!(f, "Schema reset"),
            Phase::DataLoaded => write!(f, "Data loaded"),
            Phase::Verified => write!(f, "Verified"),
            Phase::Closed => write!(f, "Closed"),
            Phase::Failed => write!(f, "Failed"),
        }
    }
}

/// Trait for UI implementations - allows both console and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn section(&mut self, title: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
}

const RULE_WIDTH: usize = 70;

/// Prints banners and status lines to stdout, with a progress bar per load
pub struct ConsoleUi {
    bar: Option<ProgressBar>,
    style: ProgressStyle,
}

impl ConsoleUi {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("  {msg:20} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        Self {
            bar: None,
            style,
        }
    }

    pub fn banner(&mut self, title: &str) {
        println!("{}", "=".repeat(RULE_WIDTH));
        println!("{}", title);
        println!("{}", "=".repeat(RULE_WIDTH));
    }
}

impl Default for ConsoleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for ConsoleUi {
    // Phases show up as section headings and status lines
    fn set_phase(&mut self, _phase: Phase) {}

    fn section(&mut self, title: impl Into<String>) {
        println!("\n{}", title.into());
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let style = &self.style;
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total);
            bar.set_style(style.clone());
            bar
        });
        bar.set_length(total);
        bar.set_position(current);
        bar.set_message(label.into());
    }

    fn clear_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        match &self.bar {
            Some(bar) => bar.println(message),
            None => println!("{}", message),
        }
    }
}

impl Drop for ConsoleUi {
    fn drop(&mut self) {
        self.clear_progress();
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi {
    phases: Vec<Phase>,
    messages: Vec<String>,
}

impl SilentUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every phase the pipeline entered, in order
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Status lines, without any progress output
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, phase: Phase) {
        self.phases.push(phase);
    }
    fn section(&mut self, _title: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}
