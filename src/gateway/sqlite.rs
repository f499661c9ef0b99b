use super::{GatewayError, GatewayResult, Predicate, TableGateway, Value};
use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Gateway backend over a read-only SQLite database file.
///
/// Each query opens its own read-only connection and runs on the blocking
/// thread pool, so concurrent requests never share a connection and no lock
/// is held across a request's round trips.
pub struct SqliteGateway {
    database: PathBuf,
}

impl SqliteGateway {
    pub fn new<P: AsRef<Path>>(database: P) -> Self {
        Self {
            database: database.as_ref().to_path_buf(),
        }
    }
}

fn engine_error(err: rusqlite::Error) -> GatewayError {
    GatewayError::Engine(err.to_string())
}

fn open_read_only(database: &Path) -> GatewayResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Connection::open_with_flags(database, flags).map_err(engine_error)
}

fn table_exists(connection: &Connection, relation: &str) -> GatewayResult<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .map_err(engine_error)?;
    stmt.exists([relation]).map_err(engine_error)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Int(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn from_sql(value: SqlValue) -> GatewayResult<Value> {
    match value {
        SqlValue::Null => Ok(Value::Null),
        SqlValue::Integer(v) => Ok(Value::Int(v)),
        SqlValue::Real(v) => Ok(Value::Real(v)),
        SqlValue::Text(s) => Ok(Value::Text(s)),
        SqlValue::Blob(_) => Err(GatewayError::Engine("unexpected blob value".to_string())),
    }
}

/// Renders a predicate as a WHERE clause, pushing bind parameters in order.
fn predicate_sql(predicate: &Predicate, params: &mut Vec<SqlValue>) -> String {
    match predicate {
        Predicate::All => "1 = 1".to_string(),
        Predicate::Eq(column, value) => {
            params.push(to_sql(value));
            format!("{} = ?", quote_ident(column))
        }
        Predicate::IntRange { column, lo, hi } => {
            params.push(SqlValue::Integer(*lo));
            params.push(SqlValue::Integer(*hi));
            format!("{} BETWEEN ? AND ?", quote_ident(column))
        }
        Predicate::KeyIn { columns, keys } => {
            if keys.is_empty() {
                return "1 = 0".to_string();
            }
            let cols = columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            let tuple = format!("({})", vec!["?"; columns.len()].join(", "));
            let tuples = vec![tuple; keys.len()].join(", ");
            for key in keys {
                for value in key {
                    params.push(to_sql(value));
                }
            }
            format!("({cols}) IN (VALUES {tuples})")
        }
        Predicate::And(parts) => {
            if parts.is_empty() {
                return "1 = 1".to_string();
            }
            parts
                .iter()
                .map(|p| format!("({})", predicate_sql(p, params)))
                .collect::<Vec<_>>()
                .join(" AND ")
        }
    }
}

fn run_query(
    database: &Path,
    relation: &str,
    predicate: &Predicate,
    project: &[String],
    order_by: &[String],
) -> GatewayResult<Vec<Vec<Value>>> {
    let connection = open_read_only(database)?;
    if !table_exists(&connection, relation)? {
        return Err(GatewayError::RelationNotFound(relation.to_string()));
    }

    let mut params: Vec<SqlValue> = Vec::new();
    let where_sql = predicate_sql(predicate, &mut params);
    let columns = project
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!(
        "SELECT {columns} FROM {} WHERE {where_sql}",
        quote_ident(relation)
    );
    if !order_by.is_empty() {
        let order = order_by
            .iter()
            .map(|c| format!("{} ASC", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" ORDER BY ");
        sql.push_str(&order);
    }

    let mut stmt = connection.prepare(&sql).map_err(engine_error)?;
    let mut rows = stmt
        .query(rusqlite::params_from_iter(params))
        .map_err(engine_error)?;
    let mut result = Vec::new();
    while let Some(row) = rows.next().map_err(engine_error)? {
        let mut tuple = Vec::with_capacity(project.len());
        for i in 0..project.len() {
            let value: SqlValue = row.get(i).map_err(engine_error)?;
            tuple.push(from_sql(value)?);
        }
        result.push(tuple);
    }
    Ok(result)
}

#[async_trait]
impl TableGateway for SqliteGateway {
    async fn query(
        &self,
        relation: &str,
        predicate: Predicate,
        project: &[&str],
        order_by: &[&str],
    ) -> GatewayResult<Vec<Vec<Value>>> {
        let database = self.database.clone();
        let relation = relation.to_string();
        let project: Vec<String> = project.iter().map(|s| s.to_string()).collect();
        let order_by: Vec<String> = order_by.iter().map(|s| s.to_string()).collect();
        tokio::task::spawn_blocking(move || {
            run_query(&database, &relation, &predicate, &project, &order_by)
        })
        .await
        .map_err(|e| GatewayError::Engine(e.to_string()))?
    }

    async fn relation_exists(&self, relation: &str) -> GatewayResult<bool> {
        let database = self.database.clone();
        let relation = relation.to_string();
        tokio::task::spawn_blocking(move || {
            let connection = open_read_only(&database)?;
            table_exists(&connection, &relation)
        })
        .await
        .map_err(|e| GatewayError::Engine(e.to_string()))?
    }

    async fn list_relations(&self, prefix: &str) -> GatewayResult<Vec<String>> {
        let database = self.database.clone();
        // LIKE wildcards in the prefix must match literally.
        let pattern = format!(
            "{}%",
            prefix
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        );
        tokio::task::spawn_blocking(move || {
            let connection = open_read_only(&database)?;
            let mut stmt = connection
                .prepare(
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name LIKE ?1 ESCAPE '\\' \
                     ORDER BY name",
                )
                .map_err(engine_error)?;
            let names = stmt
                .query_map([pattern], |row| row.get::<_, String>(0))
                .map_err(engine_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(engine_error)?;
            Ok(names)
        })
        .await
        .map_err(|e| GatewayError::Engine(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_db() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let connection = Connection::open(file.path()).unwrap();
        connection
            .execute_batch(
                r#"
                CREATE TABLE "genomes/picea-v1" (
                    chromosome_id TEXT, chunk_id INTEGER, sequence TEXT, length INTEGER
                );
                INSERT INTO "genomes/picea-v1" VALUES
                    ('Chr01', 1, 'CCCC', 4),
                    ('Chr01', 0, 'AAAA', 4),
                    ('Chr02', 0, 'GGGG', 4);
                "#,
            )
            .unwrap();
        file
    }

    #[tokio::test]
    async fn test_query_with_range_and_order() {
        let db = build_test_db();
        let gateway = SqliteGateway::new(db.path());
        let rows = gateway
            .query(
                "genomes/picea-v1",
                Predicate::And(vec![
                    Predicate::Eq("chromosome_id", "Chr01".into()),
                    Predicate::IntRange {
                        column: "chunk_id",
                        lo: 0,
                        hi: 1,
                    },
                ]),
                &["chunk_id", "sequence"],
                &["chunk_id"],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], Value::Int(0));
        assert_eq!(rows[0][1], Value::Text("AAAA".to_string()));
        assert_eq!(rows[1][0], Value::Int(1));
    }

    #[tokio::test]
    async fn test_composite_key_in() {
        let db = build_test_db();
        let gateway = SqliteGateway::new(db.path());
        let rows = gateway
            .query(
                "genomes/picea-v1",
                Predicate::KeyIn {
                    columns: vec!["chromosome_id", "chunk_id"],
                    keys: vec![
                        vec!["Chr01".into(), Value::Int(1)],
                        vec!["Chr02".into(), Value::Int(0)],
                    ],
                },
                &["sequence"],
                &["sequence"],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], Value::Text("CCCC".to_string()));
        assert_eq!(rows[1][0], Value::Text("GGGG".to_string()));
    }

    #[tokio::test]
    async fn test_missing_relation() {
        let db = build_test_db();
        let gateway = SqliteGateway::new(db.path());
        let err = gateway
            .query("genomes/none", Predicate::All, &["sequence"], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::RelationNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_relations() {
        let db = build_test_db();
        let gateway = SqliteGateway::new(db.path());
        let names = gateway.list_relations("genomes/").await.unwrap();
        assert_eq!(names, vec!["genomes/picea-v1".to_string()]);
        assert!(gateway.list_relations("annotations/").await.unwrap().is_empty());
    }
}
