use crate::schema::{ResetMode, TableSchema};

/// PostgreSQL caps a statement at this many bind parameters
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Generate the idempotent DROP TABLE statement for a table
pub fn generate_drop_table(schema: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {} CASCADE", schema.name)
}

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema, mode: ResetMode) -> String {
    let if_not_exists = match mode {
        ResetMode::Recreate => "",
        ResetMode::CreateIfMissing => "IF NOT EXISTS ",
    };
    let mut sql = format!("CREATE TABLE {}{} (\n", if_not_exists, schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let mut def = format!("    {} {}", col.name, col.col_type);

        if col.primary_key {
            def.push_str(" PRIMARY KEY");
        } else {
            if col.unique {
                def.push_str(" UNIQUE");
            }
            if !col.nullable {
                def.push_str(" NOT NULL");
            }
        }
        if let Some(expr) = col.default {
            def.push_str(&format!(" DEFAULT {}", expr));
        }
        if let Some(expr) = col.check {
            def.push_str(&format!(" CHECK ({})", expr));
        }

        columns.push(def);
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for declared indexes
pub fn generate_indexes(schema: &TableSchema, mode: ResetMode) -> Vec<String> {
    let if_not_exists = match mode {
        ResetMode::Recreate => "",
        ResetMode::CreateIfMissing => "IF NOT EXISTS ",
    };

    schema
        .indexes
        .iter()
        .map(|index| {
            format!(
                "CREATE INDEX {}idx_{}_{} ON {}({})",
                if_not_exists,
                schema.name,
                index.columns.join("_"),
                schema.name,
                index.columns.join(", ")
            )
        })
        .collect()
}

/// Rows per multi-row INSERT for a given column count
pub fn rows_per_statement(column_count: usize, batch_size: usize) -> usize {
    if column_count == 0 {
        return batch_size.max(1);
    }
    (MAX_BIND_PARAMS / column_count).min(batch_size).max(1)
}

/// Generate a multi-row INSERT with numbered placeholders
pub fn generate_insert(table: &str, columns: &[&str], row_count: usize) -> String {
    let mut sql = format!("INSERT INTO {} ({}) VALUES ", table, columns.join(", "));
    let width = columns.len();

    let tuples: Vec<String> = (0..row_count)
        .map(|row| {
            let placeholders: Vec<String> = (1..=width)
                .map(|col| format!("${}", row * width + col))
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();

    sql.push_str(&tuples.join(", "));
    sql
}
