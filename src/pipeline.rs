//! The setup run: connect, reset schema, load, verify, commit

use std::path::{Path, PathBuf};

use crate::config::DbConfig;
use crate::error::{Result, SetupError};
use crate::parser::read_source;
use crate::schema::{Dataset, DependencyResolver, Source, TableSchema};
use crate::ui::{Phase, Ui};
use crate::verify::{verify, VerificationReport};
use crate::writer::{connect, PgWriter};

#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Directory holding the dataset's seed files
    pub data_dir: PathBuf,
    /// Customer whose orders the sample query lists
    pub sample_customer: i32,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sample_customer: 1,
        }
    }
}

/// Table order for a dataset, both directions
#[derive(Debug, Clone)]
pub struct Plan {
    pub create_order: Vec<&'static TableSchema>,
    pub drop_order: Vec<&'static TableSchema>,
}

impl Plan {
    pub fn for_dataset(dataset: &Dataset) -> Result<Self> {
        let resolver = DependencyResolver::new(dataset.tables);
        Ok(Self {
            create_order: resolver.creation_order()?,
            drop_order: resolver.drop_order()?,
        })
    }
}

/// A table paired with the file it is loaded from
#[derive(Debug, Clone)]
pub struct LoadStep {
    pub schema: &'static TableSchema,
    pub source: Source,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct SetupSummary {
    pub loaded: Vec<(&'static str, u64)>,
    pub report: VerificationReport,
}

impl SetupSummary {
    pub fn total_records(&self) -> u64 {
        self.loaded.iter().map(|(_, n)| n).sum()
    }
}

/// Resolve every seed file in load order; all must exist
pub fn locate_sources(tables: &[&'static TableSchema], data_dir: &Path) -> Result<Vec<LoadStep>> {
    tables
        .iter()
        .filter_map(|schema| schema.source.map(|source| (*schema, source)))
        .map(|(schema, source)| {
            let path = data_dir.join(source.file);
            if !path.is_file() {
                return Err(SetupError::FileNotFound { path });
            }
            Ok(LoadStep {
                schema,
                source,
                path,
            })
        })
        .collect()
}

/// Run the full pipeline for `dataset` inside a single transaction
pub fn run_setup(
    config: &DbConfig,
    dataset: &'static Dataset,
    options: &SetupOptions,
    ui: &mut impl Ui,
) -> Result<SetupSummary> {
    ui.set_phase(Phase::Idle);
    let plan = Plan::for_dataset(dataset)?;
    let steps = locate_sources(&plan.create_order, &options.data_dir).inspect_err(|_| {
        ui.set_phase(Phase::Failed);
    })?;

    let mut client = connect(config).inspect_err(|_| ui.set_phase(Phase::Failed))?;
    ui.log(format!("✓ Connected to {}", config.target()));
    ui.set_phase(Phase::Connected);

    let mut writer = PgWriter::begin(&mut client).inspect_err(|_| ui.set_phase(Phase::Failed))?;

    let outcome = match provision(&mut writer, dataset, &plan, &steps, options, ui) {
        Ok((loaded, report)) => match writer.commit() {
            Ok(()) => {
                ui.set_phase(Phase::Closed);
                Ok(SetupSummary { loaded, report })
            }
            Err(err) => {
                ui.set_phase(Phase::Failed);
                Err(err)
            }
        },
        Err(err) => {
            ui.set_phase(Phase::Failed);
            ui.clear_progress();
            // Dropping an unfinished transaction also rolls back
            if writer.rollback().is_ok() {
                ui.log("✗ Error occurred. All changes rolled back");
            }
            Err(err)
        }
    };

    drop(client);
    ui.log("\n✓ Database connection closed");
    outcome
}

fn provision(
    writer: &mut PgWriter<'_>,
    dataset: &Dataset,
    plan: &Plan,
    steps: &[LoadStep],
    options: &SetupOptions,
    ui: &mut impl Ui,
) -> Result<(Vec<(&'static str, u64)>, VerificationReport)> {
    ui.section("Creating tables...");
    writer.reset_tables(&plan.drop_order, &plan.create_order, dataset.reset, ui)?;
    ui.set_phase(Phase::SchemaReset);

    let mut loaded = Vec::with_capacity(steps.len());
    if !steps.is_empty() {
        ui.section("Loading data...");
    }
    for step in steps {
        let rows = read_source(&step.path, step.schema, &step.source)?;
        let count = writer.import_table(step.schema, &rows, ui)?;
        loaded.push((step.schema.name, count));
    }
    ui.set_phase(Phase::DataLoaded);

    let report = verify(
        writer.transaction(),
        &plan.create_order,
        dataset.sample,
        options.sample_customer,
        ui,
    )?;
    ui.set_phase(Phase::Verified);

    Ok((loaded, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{ECOMMERCE, LABELS, READING};
    use crate::ui::SilentUi;
    use std::fs;
    use tempfile::TempDir;

    fn write_all_but(dir: &Path, skip: &str) {
        for file in ["customers.csv", "products.csv", "orders.csv", "order_items.csv"] {
            if file != skip {
                fs::write(dir.join(file), "placeholder\n").unwrap();
            }
        }
    }

    #[test]
    fn test_plan_orders_tables() {
        let plan = Plan::for_dataset(&ECOMMERCE).unwrap();
        let create: Vec<_> = plan.create_order.iter().map(|t| t.name).collect();
        let drop: Vec<_> = plan.drop_order.iter().map(|t| t.name).collect();
        assert_eq!(create, vec!["customers", "products", "orders", "order_items"]);
        assert_eq!(drop, vec!["order_items", "orders", "products", "customers"]);
    }

    #[test]
    fn test_locate_sources_in_load_order() {
        let dir = TempDir::new().unwrap();
        write_all_but(dir.path(), "");

        let plan = Plan::for_dataset(&ECOMMERCE).unwrap();
        let steps = locate_sources(&plan.create_order, dir.path()).unwrap();
        let files: Vec<_> = steps
            .iter()
            .map(|s| s.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            files,
            vec!["customers.csv", "products.csv", "orders.csv", "order_items.csv"]
        );
    }

    #[test]
    fn test_tables_without_source_are_not_loaded() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::for_dataset(&READING).unwrap();
        assert!(locate_sources(&plan.create_order, dir.path()).unwrap().is_empty());

        let plan = Plan::for_dataset(&LABELS).unwrap();
        assert!(matches!(
            locate_sources(&plan.create_order, dir.path()),
            Err(SetupError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_file_fails_before_connecting() {
        let dir = TempDir::new().unwrap();
        write_all_but(dir.path(), "products.csv");

        // Unroutable config: reaching the connector would be a different error
        let config = DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..DbConfig::default()
        };
        let options = SetupOptions {
            data_dir: dir.path().to_path_buf(),
            sample_customer: 1,
        };
        let mut ui = SilentUi::new();

        let err = run_setup(&config, &ECOMMERCE, &options, &mut ui).unwrap_err();
        match err {
            SetupError::FileNotFound { path } => assert!(path.ends_with("products.csv")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ui.phases(), &[Phase::Idle, Phase::Failed]);
    }

    #[test]
    fn test_connection_failure_reaches_failed_phase() {
        let dir = TempDir::new().unwrap();
        write_all_but(dir.path(), "");

        let config = DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..DbConfig::default()
        };
        let options = SetupOptions {
            data_dir: dir.path().to_path_buf(),
            sample_customer: 1,
        };
        let mut ui = SilentUi::new();

        let err = run_setup(&config, &ECOMMERCE, &options, &mut ui).unwrap_err();
        assert!(matches!(err, SetupError::Connection { .. }));
        assert_eq!(ui.phases(), &[Phase::Idle, Phase::Failed]);
    }
}
