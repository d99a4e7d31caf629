use anyhow::{anyhow, Result};
use pg_seed::{
    cli::{Cli, Commands},
    config::DbConfig,
    pipeline::{run_setup, Plan, SetupOptions},
    schema::{dataset_names, get_dataset, Dataset, DependencyResolver, ResetMode, ALL_DATASETS},
    server::{serve, ServeOptions, DEFAULT_PORTS},
    writer::{generate_create_table, generate_drop_table, generate_indexes},
    ConsoleUi,
};
use std::process::ExitCode;
use std::time::Instant;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Setup {
            dataset,
            data_dir,
            sample_customer,
            connection,
        } => {
            let start = Instant::now();
            let dataset = find_dataset(&dataset)?;
            let mut ui = ConsoleUi::new();
            ui.banner("PostgreSQL Database Setup");

            let config = match DbConfig::resolve(&connection) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("✗ {}", err);
                    return Ok(ExitCode::FAILURE);
                }
            };
            let options = SetupOptions {
                data_dir,
                sample_customer,
            };

            match run_setup(&config, dataset, &options, &mut ui) {
                Ok(summary) => {
                    println!();
                    ui.banner(&format!(
                        "✓ Database setup completed successfully! ({} records in {:.1}s)",
                        summary.total_records(),
                        start.elapsed().as_secs_f64()
                    ));
                }
                Err(err) => {
                    eprintln!("\n✗ {}", err);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Ddl { dataset } => {
            let dataset = find_dataset(&dataset)?;
            let plan = Plan::for_dataset(dataset)?;

            if dataset.reset == ResetMode::Recreate {
                for schema in &plan.drop_order {
                    println!("{};", generate_drop_table(schema));
                }
                println!();
            }
            for schema in &plan.create_order {
                println!("{};\n", generate_create_table(schema, dataset.reset));
                for index in generate_indexes(schema, dataset.reset) {
                    println!("{};", index);
                }
            }
        }

        Commands::ListTables { dataset } => {
            let datasets: Vec<&Dataset> = match dataset {
                Some(name) => vec![find_dataset(&name)?],
                None => ALL_DATASETS.to_vec(),
            };

            for dataset in datasets {
                println!("{} - {}", dataset.name, dataset.description);
                let resolver = DependencyResolver::new(dataset.tables);
                for schema in resolver.creation_order()? {
                    let mut line = format!("  {}", schema.name);
                    if let Some(source) = schema.source {
                        line.push_str(&format!(" <- {}", source.file));
                    }
                    let dependents = resolver.dependents(schema.name);
                    if !dependents.is_empty() {
                        line.push_str(&format!(" (referenced by {})", dependents.join(", ")));
                    }
                    println!("{}", line);
                }
                println!();
            }
        }

        Commands::Serve {
            dir,
            port,
            page,
            no_browser,
        } => {
            let ports = match port {
                Some(port) => vec![port],
                None => DEFAULT_PORTS.to_vec(),
            };

            if let Err(err) = serve(ServeOptions {
                dir,
                ports,
                page,
                open_browser: !no_browser,
            }) {
                eprintln!("❌ Error: {:#}", err);
                eprintln!();
                eprintln!("💡 Stop the other server or pick a free port with --port");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn find_dataset(name: &str) -> Result<&'static Dataset> {
    get_dataset(name).ok_or_else(|| {
        anyhow!(
            "Unknown dataset: {} (available: {})",
            name,
            dataset_names().join(", ")
        )
    })
}
