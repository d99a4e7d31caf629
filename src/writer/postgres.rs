use postgres::types::ToSql;
use postgres::{Client, NoTls, Transaction};

use super::schema_gen::{
    generate_create_table, generate_drop_table, generate_indexes, generate_insert,
    rows_per_statement,
};
use crate::config::DbConfig;
use crate::error::{Result, SetupError};
use crate::parser::RowSet;
use crate::schema::{ResetMode, TableSchema};
use crate::ui::Ui;

const BATCH_SIZE: usize = 1000;

/// Open the single session used for a run
pub fn connect(config: &DbConfig) -> Result<Client> {
    config
        .to_pg_config()
        .connect(NoTls)
        .map_err(|source| SetupError::Connection {
            target: config.target(),
            source,
        })
}

/// Owns the run's transaction; dropping it without `commit` rolls back
pub struct PgWriter<'a> {
    tx: Transaction<'a>,
}

impl<'a> PgWriter<'a> {
    pub fn begin(client: &'a mut Client) -> Result<Self> {
        let tx = client
            .transaction()
            .map_err(|source| SetupError::Transaction { source })?;
        Ok(Self { tx })
    }

    /// Drop `drop_order` (children first) then create `create_order`
    /// (parents first) with their indexes
    pub fn reset_tables(
        &mut self,
        drop_order: &[&TableSchema],
        create_order: &[&TableSchema],
        mode: ResetMode,
        ui: &mut impl Ui,
    ) -> Result<()> {
        if mode == ResetMode::Recreate {
            for schema in drop_order {
                self.tx
                    .batch_execute(&generate_drop_table(schema))
                    .map_err(|source| SetupError::Schema {
                        table: schema.name,
                        source,
                    })?;
            }
            ui.log("✓ Dropped existing tables (if any)");
        }

        for schema in create_order {
            let sql = generate_create_table(schema, mode);
            self.tx
                .batch_execute(&sql)
                .map_err(|source| SetupError::Schema {
                    table: schema.name,
                    source,
                })?;

            for index_sql in generate_indexes(schema, mode) {
                self.tx
                    .batch_execute(&index_sql)
                    .map_err(|source| SetupError::Schema {
                        table: schema.name,
                        source,
                    })?;
            }

            ui.log(format!("✓ Created {} table", schema.name));
        }

        Ok(())
    }

    /// Append every row of `rows` to `schema` with multi-row inserts
    pub fn import_table(
        &mut self,
        schema: &'static TableSchema,
        rows: &RowSet,
        ui: &mut impl Ui,
    ) -> Result<u64> {
        let total = rows.len() as u64;
        let per_statement = rows_per_statement(rows.columns.len(), BATCH_SIZE);
        let mut count: u64 = 0;

        ui.set_progress(0, total, schema.name);

        for batch in rows.rows.chunks(per_statement) {
            let sql = generate_insert(schema.name, &rows.columns, batch.len());
            let params: Vec<&(dyn ToSql + Sync)> = batch
                .iter()
                .flat_map(|row| row.iter().map(|v| v as &(dyn ToSql + Sync)))
                .collect();

            self.tx
                .execute(sql.as_str(), &params)
                .map_err(|source| SetupError::Load {
                    table: schema.name,
                    source,
                })?;

            count += batch.len() as u64;
            ui.set_progress(count, total, schema.name);
        }

        ui.clear_progress();
        ui.log(format!("✓ Loaded {} records into {}", count, schema.name));

        Ok(count)
    }

    /// The open transaction, for verification queries
    pub fn transaction(&mut self) -> &mut Transaction<'a> {
        &mut self.tx
    }

    pub fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .map_err(|source| SetupError::Commit { source })
    }

    pub fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .map_err(|source| SetupError::Transaction { source })
    }
}
