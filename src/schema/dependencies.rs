use super::types::TableSchema;
use crate::error::{Result, SetupError};
use std::collections::{HashMap, HashSet};

/// Orders a set of tables so that foreign-key parents come first
pub struct DependencyResolver {
    tables: Vec<&'static TableSchema>,
    /// Map of table name -> tables it depends on, in declaration order
    deps: HashMap<&'static str, Vec<&'static str>>,
    /// Map of table name -> tables that depend on it
    reverse_deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new(tables: &[&'static TableSchema]) -> Self {
        let mut deps: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        let mut reverse_deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();

        for table in tables {
            let table_deps = deps.entry(table.name).or_default();
            for fk in table.foreign_keys {
                if !table_deps.contains(&fk.references_table) {
                    table_deps.push(fk.references_table);
                }
                reverse_deps
                    .entry(fk.references_table)
                    .or_default()
                    .insert(table.name);
            }
        }

        Self {
            tables: tables.to_vec(),
            deps,
            reverse_deps,
        }
    }

    /// Tables in creation/load order (parents before children)
    pub fn creation_order(&self) -> Result<Vec<&'static TableSchema>> {
        let mut result = Vec::with_capacity(self.tables.len());
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        // Declaration order breaks ties so the output is stable
        for table in &self.tables {
            if !visited.contains(table.name) {
                self.visit(table.name, &mut visited, &mut temp_visited, &mut result)?;
            }
        }

        Ok(result)
    }

    /// Tables in drop order (children before parents)
    pub fn drop_order(&self) -> Result<Vec<&'static TableSchema>> {
        let mut order = self.creation_order()?;
        order.reverse();
        Ok(order)
    }

    /// Tables that reference `name` through a foreign key
    pub fn dependents(&self, name: &str) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .reverse_deps
            .get(name)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    fn get(&self, name: &str) -> Option<&'static TableSchema> {
        self.tables.iter().find(|t| t.name == name).copied()
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<()> {
        if temp_visited.contains(name) {
            return Err(SetupError::Dependency(format!(
                "circular dependency detected at: {}",
                name
            )));
        }
        if visited.contains(name) {
            return Ok(());
        }

        let table = self
            .get(name)
            .ok_or_else(|| SetupError::Dependency(format!("unknown table: {}", name)))?;

        temp_visited.insert(table.name);

        if let Some(deps) = self.deps.get(name) {
            for dep in deps {
                // Self-references need no ordering
                if *dep == name {
                    continue;
                }
                if self.get(dep).is_none() {
                    return Err(SetupError::Dependency(format!(
                        "{} references unknown table: {}",
                        name, dep
                    )));
                }
                self.visit(*dep, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(table.name);
        visited.insert(table.name);
        result.push(table);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::*;
    use crate::schema::types::{Column, ColumnType, ForeignKey};

    fn names(tables: &[&TableSchema]) -> Vec<&'static str> {
        tables.iter().map(|t| t.name).collect()
    }

    #[test]
    fn test_ecommerce_parents_before_children() {
        // Declared children-first to make sure the order is computed
        let resolver = DependencyResolver::new(&[&ORDER_ITEMS, &ORDERS, &PRODUCTS, &CUSTOMERS]);
        let order = names(&resolver.creation_order().unwrap());

        let pos = |n: &str| order.iter().position(|&t| t == n).unwrap();
        assert_eq!(order.len(), 4);
        assert!(pos("customers") < pos("orders"));
        assert!(pos("orders") < pos("order_items"));
        assert!(pos("products") < pos("order_items"));
    }

    #[test]
    fn test_declaration_order_is_kept_when_valid() {
        let resolver = DependencyResolver::new(ECOMMERCE.tables);
        assert_eq!(
            names(&resolver.creation_order().unwrap()),
            vec!["customers", "products", "orders", "order_items"]
        );
        assert_eq!(
            names(&resolver.drop_order().unwrap()),
            vec!["order_items", "orders", "products", "customers"]
        );
    }

    #[test]
    fn test_dependents() {
        let resolver = DependencyResolver::new(ECOMMERCE.tables);
        assert_eq!(resolver.dependents("products"), vec!["order_items"]);
        assert_eq!(resolver.dependents("customers"), vec!["orders"]);
        assert!(resolver.dependents("order_items").is_empty());
    }

    #[test]
    fn test_unknown_parent_error() {
        let resolver = DependencyResolver::new(&[&ORDERS]);
        let err = resolver.creation_order().unwrap_err();
        assert!(matches!(err, SetupError::Dependency(ref msg) if msg.contains("customers")));
    }

    static NODE_A: TableSchema = TableSchema {
        name: "node_a",
        source: None,
        columns: &[
            Column::key("id", ColumnType::Integer),
            Column::new("b_id", ColumnType::Integer),
        ],
        foreign_keys: &[ForeignKey::new("b_id", "node_b").references("id")],
        indexes: &[],
    };

    static NODE_B: TableSchema = TableSchema {
        name: "node_b",
        source: None,
        columns: &[
            Column::key("id", ColumnType::Integer),
            Column::new("a_id", ColumnType::Integer),
        ],
        foreign_keys: &[ForeignKey::new("a_id", "node_a").references("id")],
        indexes: &[],
    };

    static TREE: TableSchema = TableSchema {
        name: "tree",
        source: None,
        columns: &[
            Column::key("id", ColumnType::Integer),
            Column::new("parent_id", ColumnType::Integer),
        ],
        foreign_keys: &[ForeignKey::new("parent_id", "tree").references("id")],
        indexes: &[],
    };

    #[test]
    fn test_cycle_detected() {
        let resolver = DependencyResolver::new(&[&NODE_A, &NODE_B]);
        let err = resolver.creation_order().unwrap_err();
        assert!(err.to_string().contains("circular dependency"));
    }

    #[test]
    fn test_self_reference_allowed() {
        let resolver = DependencyResolver::new(&[&TREE]);
        assert_eq!(names(&resolver.creation_order().unwrap()), vec!["tree"]);
    }
}
