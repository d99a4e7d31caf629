//! Post-load smoke checks: per-table row counts and a sample join

use chrono::NaiveDate;
use postgres::GenericClient;
use rust_decimal::Decimal;

use crate::error::{Result, SetupError};
use crate::schema::{SampleQuery, TableSchema};
use crate::ui::Ui;

const CUSTOMER_ORDERS_SQL: &str = "
    SELECT
        c.name AS customer_name,
        o.order_id,
        o.order_date,
        COUNT(oi.order_item_id) AS items_count,
        o.total_amount
    FROM customers c
    JOIN orders o ON c.customer_id = o.customer_id
    JOIN order_items oi ON o.order_id = oi.order_id
    WHERE c.customer_id = $1
    GROUP BY c.name, o.order_id, o.order_date, o.total_amount
    ORDER BY o.order_date
    LIMIT 5";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: i64,
}

/// One row of the customer orders sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerOrder {
    pub customer_name: String,
    pub order_id: i32,
    pub order_date: NaiveDate,
    pub items_count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub counts: Vec<TableCount>,
    pub sample: Vec<CustomerOrder>,
}

impl VerificationReport {
    pub fn count(&self, table: &str) -> Option<i64> {
        self.counts.iter().find(|c| c.table == table).map(|c| c.rows)
    }
}

pub fn count_rows(client: &mut impl GenericClient, tables: &[&TableSchema]) -> Result<Vec<TableCount>> {
    tables
        .iter()
        .map(|schema| {
            let row = client
                .query_one(format!("SELECT COUNT(*) FROM {}", schema.name).as_str(), &[])
                .map_err(|source| SetupError::Query { source })?;
            Ok(TableCount {
                table: schema.name,
                rows: row.get(0),
            })
        })
        .collect()
}

pub fn customer_orders(client: &mut impl GenericClient, customer_id: i32) -> Result<Vec<CustomerOrder>> {
    let rows = client
        .query(CUSTOMER_ORDERS_SQL, &[&customer_id])
        .map_err(|source| SetupError::Query { source })?;

    Ok(rows
        .iter()
        .map(|row| CustomerOrder {
            customer_name: row.get("customer_name"),
            order_id: row.get("order_id"),
            order_date: row.get("order_date"),
            items_count: row.get("items_count"),
            total_amount: row.get("total_amount"),
        })
        .collect())
}

/// Count rows in every table and run the dataset's sample query
pub fn verify(
    client: &mut impl GenericClient,
    tables: &[&TableSchema],
    sample: Option<SampleQuery>,
    sample_customer: i32,
    ui: &mut impl Ui,
) -> Result<VerificationReport> {
    ui.section("Verifying data...");

    let counts = count_rows(client, tables)?;
    for count in &counts {
        ui.log(format!("  {}: {} records", count.table, count.rows));
    }

    let sample = match sample {
        Some(SampleQuery::CustomerOrders) => {
            ui.section("Testing relationships with sample query:");
            let orders = customer_orders(client, sample_customer)?;
            ui.log(format!("\n  Sample: Orders for customer {}:", sample_customer));
            ui.log(format!("  {}", "-".repeat(70)));
            for order in &orders {
                ui.log(format_order(order));
            }
            orders
        }
        None => Vec::new(),
    };

    Ok(VerificationReport { counts, sample })
}

fn format_order(order: &CustomerOrder) -> String {
    format!(
        "  {:20} | Order #{} | {} | {} items | ${}",
        order.customer_name, order.order_id, order.order_date, order.items_count, order.total_amount
    )
}
