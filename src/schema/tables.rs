//! Table and dataset definitions

use super::types::*;

const MONEY: ColumnType = ColumnType::Decimal {
    precision: 10,
    scale: 2,
};

// =============================================================================
// E-commerce
// =============================================================================

pub static CUSTOMERS: TableSchema = TableSchema {
    name: "customers",
    source: Some(Source::csv("customers.csv")),
    columns: &[
        Column::key("customer_id", ColumnType::Integer),
        Column::required("name", ColumnType::Varchar(100)),
        Column::required("email", ColumnType::Varchar(100)).unique(),
        Column::new("phone", ColumnType::Varchar(20)),
        Column::new("city", ColumnType::Varchar(50)),
        Column::new("state", ColumnType::Varchar(2)),
        Column::new("country", ColumnType::Varchar(50)),
        Column::new("created_at", ColumnType::Date),
    ],
    foreign_keys: &[],
    indexes: &[],
};

pub static PRODUCTS: TableSchema = TableSchema {
    name: "products",
    source: Some(Source::csv("products.csv")),
    columns: &[
        Column::key("product_id", ColumnType::Integer),
        Column::required("product_name", ColumnType::Varchar(100)),
        Column::new("category", ColumnType::Varchar(50)),
        Column::required("price", MONEY),
        Column::new("stock_quantity", ColumnType::Integer),
        Column::new("supplier", ColumnType::Varchar(100)),
        Column::new("sku", ColumnType::Varchar(50)).unique(),
    ],
    foreign_keys: &[],
    indexes: &[],
};

pub static ORDERS: TableSchema = TableSchema {
    name: "orders",
    source: Some(Source::csv("orders.csv")),
    columns: &[
        Column::key("order_id", ColumnType::Integer),
        Column::required("customer_id", ColumnType::Integer),
        Column::required("order_date", ColumnType::Date),
        Column::required("total_amount", MONEY),
        Column::new("status", ColumnType::Varchar(20)),
        Column::new("shipping_address", ColumnType::Text),
        Column::new("payment_method", ColumnType::Varchar(50)),
    ],
    foreign_keys: &[ForeignKey::new("customer_id", "customers")],
    indexes: &[],
};

pub static ORDER_ITEMS: TableSchema = TableSchema {
    name: "order_items",
    source: Some(Source::csv("order_items.csv")),
    columns: &[
        Column::key("order_item_id", ColumnType::Integer),
        Column::required("order_id", ColumnType::Integer),
        Column::required("product_id", ColumnType::Integer),
        Column::required("quantity", ColumnType::Integer),
        Column::required("price_per_unit", MONEY),
        Column::required("subtotal", MONEY),
    ],
    foreign_keys: &[
        ForeignKey::new("order_id", "orders"),
        ForeignKey::new("product_id", "products"),
    ],
    indexes: &[],
};

// =============================================================================
// Reading recommender
// =============================================================================

pub static READ_ARTICLES: TableSchema = TableSchema {
    name: "read_articles",
    source: None,
    columns: &[
        Column::key("id", ColumnType::Serial),
        Column::required("title", ColumnType::Varchar(500)),
        Column::required("url", ColumnType::Varchar(1000)).unique(),
        Column::new("summary", ColumnType::Text),
        Column::new("source", ColumnType::Varchar(200)),
        Column::new("content_type", ColumnType::Varchar(50)),
        Column::new("subtopic", ColumnType::Varchar(100)),
        Column::new("date_published", ColumnType::Timestamp),
        Column::new("date_recommended", ColumnType::Timestamp).default("CURRENT_TIMESTAMP"),
        Column::new("date_read", ColumnType::Timestamp),
        Column::new("rating", ColumnType::Integer).check("rating >= 1 AND rating <= 5"),
        Column::new("notes", ColumnType::Text),
        Column::new("author", ColumnType::Varchar(200)),
        Column::new("reading_time_minutes", ColumnType::Integer),
        Column::new("is_read", ColumnType::Boolean).default("FALSE"),
        Column::new("created_at", ColumnType::Timestamp).default("CURRENT_TIMESTAMP"),
        Column::new("updated_at", ColumnType::Timestamp).default("CURRENT_TIMESTAMP"),
    ],
    foreign_keys: &[],
    indexes: &[
        Index::on(&["url"]),
        Index::on(&["source"]),
        Index::on(&["content_type"]),
        Index::on(&["date_recommended"]),
        Index::on(&["is_read"]),
    ],
};

// =============================================================================
// Mail labels
// =============================================================================

pub static SENDER_LABEL_MAPPING: TableSchema = TableSchema {
    name: "sender_label_mapping",
    // Column A holds the label, column B the sender pattern
    source: Some(Source::sheet("email_labels.xlsx", &["gmail_label", "pattern"])),
    columns: &[
        Column::key("id", ColumnType::Serial),
        Column::required("pattern", ColumnType::Varchar(255)),
        Column::required("gmail_label", ColumnType::Varchar(255)),
        Column::new("created_at", ColumnType::Timestamp).default("CURRENT_TIMESTAMP"),
    ],
    foreign_keys: &[],
    indexes: &[],
};

// =============================================================================
// Dataset Registry
// =============================================================================

pub static ECOMMERCE: Dataset = Dataset {
    name: "ecommerce",
    description: "Customers, products, orders and order items loaded from CSV",
    tables: &[&CUSTOMERS, &PRODUCTS, &ORDERS, &ORDER_ITEMS],
    reset: ResetMode::Recreate,
    sample: Some(SampleQuery::CustomerOrders),
};

pub static READING: Dataset = Dataset {
    name: "reading",
    description: "Reading recommendation tracker table and indexes",
    tables: &[&READ_ARTICLES],
    reset: ResetMode::CreateIfMissing,
    sample: None,
};

pub static LABELS: Dataset = Dataset {
    name: "labels",
    description: "Sender pattern to mail label mappings loaded from a spreadsheet",
    tables: &[&SENDER_LABEL_MAPPING],
    reset: ResetMode::Recreate,
    sample: None,
};

pub static ALL_DATASETS: &[&Dataset] = &[&ECOMMERCE, &READING, &LABELS];

/// Get dataset by name
pub fn get_dataset(name: &str) -> Option<&'static Dataset> {
    ALL_DATASETS.iter().find(|d| d.name == name).copied()
}

/// Get all dataset names
pub fn dataset_names() -> Vec<&'static str> {
    ALL_DATASETS.iter().map(|d| d.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_keys_reference_declared_columns() {
        for dataset in ALL_DATASETS {
            for table in dataset.tables {
                for fk in table.foreign_keys {
                    assert!(
                        table.column(fk.column).is_some(),
                        "{}.{} is not a column",
                        table.name,
                        fk.column
                    );
                    let parent = dataset
                        .table(fk.references_table)
                        .unwrap_or_else(|| panic!("{} is not in {}", fk.references_table, dataset.name));
                    let referenced = parent.column(fk.references_column).unwrap();
                    assert!(referenced.primary_key || referenced.unique);
                }
            }
        }
    }

    #[test]
    fn test_sheet_columns_exist() {
        for dataset in ALL_DATASETS {
            for table in dataset.tables {
                if let Some(Source {
                    format: SourceFormat::Sheet { columns },
                    ..
                }) = table.source
                {
                    for col in columns {
                        assert!(table.column(col).is_some());
                    }
                }
            }
        }
    }

    #[test]
    fn test_money_columns_are_fixed_point() {
        assert!(matches!(
            PRODUCTS.column("price").unwrap().col_type,
            ColumnType::Decimal { .. }
        ));
        for name in ["price_per_unit", "subtotal"] {
            assert!(matches!(
                ORDER_ITEMS.column(name).unwrap().col_type,
                ColumnType::Decimal { .. }
            ));
        }
        assert!(matches!(
            ORDERS.column("total_amount").unwrap().col_type,
            ColumnType::Decimal { .. }
        ));
    }

    #[test]
    fn test_get_dataset() {
        assert_eq!(get_dataset("ecommerce").unwrap().tables.len(), 4);
        assert!(get_dataset("inventory").is_none());
        assert_eq!(dataset_names(), vec!["ecommerce", "reading", "labels"]);
    }
}
