use super::{
    compare_values, GatewayError, GatewayResult, Predicate, TableGateway, Value,
};
use async_trait::async_trait;
use std::collections::BTreeMap;

struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// In-memory gateway backend.
///
/// Holds relations as plain row vectors and evaluates predicates directly.
/// Used by the test suites to exercise the core join/ordering logic without
/// an engine; rows are kept in insertion order so tests can also probe that
/// callers do not depend on storage order.
#[derive(Default)]
pub struct MemoryGateway {
    relations: BTreeMap<String, Table>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a relation with the given column names and rows.
    pub fn with_relation(
        mut self,
        name: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Self {
        self.relations.insert(
            name.to_string(),
            Table {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
        self
    }

    fn column_index(table: &Table, name: &str) -> GatewayResult<usize> {
        table
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| GatewayError::Engine(format!("no such column: {name}")))
    }

    fn matches(table: &Table, row: &[Value], predicate: &Predicate) -> GatewayResult<bool> {
        match predicate {
            Predicate::All => Ok(true),
            Predicate::Eq(column, value) => {
                let idx = Self::column_index(table, column)?;
                Ok(&row[idx] == value)
            }
            Predicate::IntRange { column, lo, hi } => {
                let idx = Self::column_index(table, column)?;
                Ok(row[idx]
                    .as_int()
                    .map(|v| v >= *lo && v <= *hi)
                    .unwrap_or(false))
            }
            Predicate::KeyIn { columns, keys } => {
                let indices = columns
                    .iter()
                    .map(|c| Self::column_index(table, c))
                    .collect::<GatewayResult<Vec<_>>>()?;
                let tuple: Vec<&Value> = indices.iter().map(|&i| &row[i]).collect();
                Ok(keys
                    .iter()
                    .any(|key| key.iter().zip(&tuple).all(|(a, &b)| a == b)))
            }
            Predicate::And(parts) => {
                for part in parts {
                    if !Self::matches(table, row, part)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl TableGateway for MemoryGateway {
    async fn query(
        &self,
        relation: &str,
        predicate: Predicate,
        project: &[&str],
        order_by: &[&str],
    ) -> GatewayResult<Vec<Vec<Value>>> {
        let table = self
            .relations
            .get(relation)
            .ok_or_else(|| GatewayError::RelationNotFound(relation.to_string()))?;

        let mut matched: Vec<&Vec<Value>> = Vec::new();
        for row in &table.rows {
            if Self::matches(table, row, &predicate)? {
                matched.push(row);
            }
        }

        if !order_by.is_empty() {
            let sort_indices = order_by
                .iter()
                .map(|c| Self::column_index(table, c))
                .collect::<GatewayResult<Vec<_>>>()?;
            matched.sort_by(|a, b| {
                sort_indices
                    .iter()
                    .map(|&i| compare_values(&a[i], &b[i]))
                    .find(|o| o.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let project_indices = project
            .iter()
            .map(|c| Self::column_index(table, c))
            .collect::<GatewayResult<Vec<_>>>()?;
        Ok(matched
            .into_iter()
            .map(|row| project_indices.iter().map(|&i| row[i].clone()).collect())
            .collect())
    }

    async fn relation_exists(&self, relation: &str) -> GatewayResult<bool> {
        Ok(self.relations.contains_key(relation))
    }

    async fn list_relations(&self, prefix: &str) -> GatewayResult<Vec<String>> {
        Ok(self
            .relations
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }
}
