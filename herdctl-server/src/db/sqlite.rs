//! Embedded SQLite backend
//!
//! Holds a single long-lived connection, so `:memory:` databases survive
//! for the life of the driver.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use herdctl_core::config::SQLITE_IN_MEMORY;
use herdctl_core::Backend;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use super::driver::{
    bind_params, ExecOutcome, Param, Row, Statement, StatementKind, StorageDriver, StorageError,
};
use super::schema;

/// SQLite file (or in-memory) driver
pub struct SqliteDriver {
    pool: SqlitePool,
}

impl SqliteDriver {
    /// Open or create the database file at `path`; `:memory:` opens a
    /// private in-memory database.
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        let options = if path == Path::new(SQLITE_IN_MEMORY) {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        tracing::debug!(path = %path.display(), "sqlite database opened");
        Ok(Self { pool })
    }

    /// Private in-memory database (for testing)
    pub async fn open_in_memory() -> Result<Self, StorageError> {
        Self::open(Path::new(SQLITE_IN_MEMORY)).await
    }
}

#[async_trait]
impl StorageDriver for SqliteDriver {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        for ddl in schema::statements(Backend::Sqlite) {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn query(&self, statement: &Statement, params: &[Param]) -> Result<Vec<Row>, StorageError> {
        let rows = bind_params(sqlx::query(statement.sql()), params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(
        &self,
        statement: &Statement,
        params: &[Param],
    ) -> Result<ExecOutcome, StorageError> {
        let result = bind_params(sqlx::query(statement.sql()), params)
            .execute(&self.pool)
            .await?;

        Ok(ExecOutcome {
            generated_id: (statement.kind() == StatementKind::Insert)
                .then(|| result.last_insert_rowid()),
            rows_affected: result.rows_affected(),
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// SQLite is dynamically typed: the stored value's type decides the JSON
/// type, except declared BOOLEAN columns which hold 0/1.
fn decode_row(row: &SqliteRow) -> Result<Row, StorageError> {
    let mut out = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let declared = column.type_info().name().to_ascii_uppercase();
            let stored = raw.type_info().name().to_ascii_uppercase();
            match (declared.as_str(), stored.as_str()) {
                ("BOOLEAN", "INTEGER") => Value::Bool(row.try_get::<i64, _>(idx)? != 0),
                (_, "INTEGER") => Value::from(row.try_get::<i64, _>(idx)?),
                (_, "REAL") => Value::from(row.try_get::<f64, _>(idx)?),
                (_, "BLOB") => Value::String(
                    String::from_utf8_lossy(&row.try_get::<Vec<u8>, _>(idx)?).into_owned(),
                ),
                _ => Value::String(row.try_get::<String, _>(idx)?),
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSERT: Statement = Statement::insert(
        r#"INSERT INTO breeding_records ("cowId", "birthRegistered", "actualBirthDate") VALUES (?, ?, ?)"#,
    );
    const SELECT: Statement =
        Statement::read(r#"SELECT * FROM breeding_records WHERE "id" = ?"#);

    async fn driver() -> SqliteDriver {
        let driver = SqliteDriver::open_in_memory().await.unwrap();
        driver.init_schema().await.unwrap();
        driver
    }

    #[tokio::test]
    async fn insert_reports_generated_id() {
        let driver = driver().await;
        let first = driver
            .execute(&INSERT, &[Param::from(1_i64), Param::from(false), Param::Text(None)])
            .await
            .unwrap();
        let second = driver
            .execute(&INSERT, &[Param::from(2_i64), Param::from(false), Param::Text(None)])
            .await
            .unwrap();

        assert_eq!(first.generated_id, Some(1));
        assert_eq!(second.generated_id, Some(2));
        assert_eq!(second.rows_affected, 1);
    }

    #[tokio::test]
    async fn rows_normalize_booleans_and_nulls() {
        let driver = driver().await;
        let outcome = driver
            .execute(
                &INSERT,
                &[
                    Param::Int(None),
                    Param::from(true),
                    Param::from("2024-03-01".to_string()),
                ],
            )
            .await
            .unwrap();

        let rows = driver
            .query(&SELECT, &[Param::Int(outcome.generated_id)])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["birthRegistered"], Value::Bool(true));
        assert_eq!(row["cowId"], Value::Null);
        assert_eq!(row["actualBirthDate"], Value::from("2024-03-01"));
        assert_eq!(row["id"], Value::from(1));
    }

    #[tokio::test]
    async fn init_schema_is_idempotent() {
        let driver = driver().await;
        driver.init_schema().await.unwrap();
        driver.init_schema().await.unwrap();

        let tables = driver
            .query(
                &Statement::read(
                    "SELECT name FROM sqlite_master WHERE type = ? AND name NOT LIKE ? ORDER BY name",
                ),
                &[Param::from("table".to_string()), Param::from("sqlite_%".to_string())],
            )
            .await
            .unwrap();
        let names: Vec<_> = tables.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![Value::from("animals"), Value::from("breeding_records")]);
    }

    #[tokio::test]
    async fn file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("herd.db");

        let driver = SqliteDriver::open(&path).await.unwrap();
        driver.init_schema().await.unwrap();
        driver
            .execute(&INSERT, &[Param::from(9_i64), Param::from(false), Param::Text(None)])
            .await
            .unwrap();
        driver.close().await;

        let reopened = SqliteDriver::open(&path).await.unwrap();
        reopened.init_schema().await.unwrap();
        let rows = reopened.query(&SELECT, &[Param::from(1_i64)]).await.unwrap();
        assert_eq!(rows[0]["cowId"], Value::from(9));
    }

    #[tokio::test]
    async fn bad_statement_is_backend_error() {
        let driver = driver().await;
        let err = driver
            .query(&Statement::read("SELECT * FROM pastures"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Backend { .. }));
        assert!(err.message().contains("pastures"));
    }
}
