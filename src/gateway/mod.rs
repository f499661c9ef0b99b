//! Tabular query gateway for the pre-built datasets.
//!
//! This module provides a trait-based abstraction over the embedded
//! analytical engine, allowing different backends to be used
//! interchangeably. The core never composes engine-native query text; it
//! only relies on equality/membership predicates over named columns, column
//! projection, and stable multi-column ascending sort.
//!
//! # Implementations
//!
//! - [`SqliteGateway`] - production backend over a read-only SQLite file
//! - [`MemoryGateway`] - in-memory fake for tests

mod memory;
mod sqlite;

pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;

use async_trait::async_trait;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("relation not found: {0}")]
    RelationNotFound(String),

    #[error("engine error: {0}")]
    Engine(String),
}

/// A single cell value in a query result or predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen to float.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

/// Structured row filter pushed down to the backend.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Every row matches.
    All,
    /// Column equals a value.
    Eq(&'static str, Value),
    /// Integer column within an inclusive range.
    IntRange {
        column: &'static str,
        lo: i64,
        hi: i64,
    },
    /// Tuple of columns matches one of the given composite keys.
    ///
    /// Backends must handle a few thousand keys in one call without a round
    /// trip per key. An empty key set matches nothing.
    KeyIn {
        columns: Vec<&'static str>,
        keys: Vec<Vec<Value>>,
    },
    /// All sub-predicates hold.
    And(Vec<Predicate>),
}

/// Backend-agnostic access to named relations.
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Runs a predicate + projection + sort over one relation.
    ///
    /// `order_by` names columns for a stable ascending sort; empty means the
    /// backend's natural order, which callers must never rely on.
    async fn query(
        &self,
        relation: &str,
        predicate: Predicate,
        project: &[&str],
        order_by: &[&str],
    ) -> GatewayResult<Vec<Vec<Value>>>;

    /// Whether a relation of this name exists.
    async fn relation_exists(&self, relation: &str) -> GatewayResult<bool>;

    /// Names of all relations starting with `prefix`, ascending.
    async fn list_relations(&self, prefix: &str) -> GatewayResult<Vec<String>>;
}

/// Total order over cell values used for multi-column sorts: nulls first,
/// then numerics, then text.
pub(crate) fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Text(_), _) => Ordering::Greater,
        (_, Value::Text(_)) => Ordering::Less,
        (x, y) => {
            let (x, y) = (x.as_real().unwrap_or(0.0), y.as_real().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
    }
}
