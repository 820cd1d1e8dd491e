//! PostgreSQL backend
//!
//! Statements get numbered placeholders; inserts append `RETURNING "id"`
//! since PostgreSQL has no last-insert-id on the command result.

use async_trait::async_trait;
use herdctl_core::Backend;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use super::driver::{
    bind_params, numbered_placeholders, ExecOutcome, Param, Row, Statement, StatementKind,
    StorageDriver, StorageError,
};
use super::schema;

/// Pooled PostgreSQL driver
pub struct PostgresDriver {
    pool: PgPool,
}

impl PostgresDriver {
    /// Connect to `database_url`. Fails if the server is unreachable.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl StorageDriver for PostgresDriver {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        for ddl in schema::statements(Backend::Postgres) {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn query(&self, statement: &Statement, params: &[Param]) -> Result<Vec<Row>, StorageError> {
        let sql = numbered_placeholders(statement.sql());
        let rows = bind_params(sqlx::query(&sql), params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(
        &self,
        statement: &Statement,
        params: &[Param],
    ) -> Result<ExecOutcome, StorageError> {
        let sql = numbered_placeholders(statement.sql());

        if statement.kind() == StatementKind::Insert {
            let sql = format!(r#"{} RETURNING "id""#, sql.trim_end());
            let row = bind_params(sqlx::query(&sql), params)
                .fetch_one(&self.pool)
                .await?;
            return Ok(ExecOutcome {
                generated_id: Some(row.try_get::<i64, _>("id")?),
                rows_affected: 1,
            });
        }

        let result = bind_params(sqlx::query(&sql), params)
            .execute(&self.pool)
            .await?;
        Ok(ExecOutcome {
            generated_id: None,
            rows_affected: result.rows_affected(),
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn decode_row(row: &PgRow) -> Result<Row, StorageError> {
    let mut out = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        if row.try_get_raw(idx)?.is_null() {
            out.insert(column.name().to_string(), Value::Null);
            continue;
        }
        let value = match column.type_info().name() {
            "BOOL" => Value::Bool(row.try_get::<bool, _>(idx)?),
            "INT2" => Value::from(row.try_get::<i16, _>(idx)?),
            "INT4" => Value::from(row.try_get::<i32, _>(idx)?),
            "INT8" => Value::from(row.try_get::<i64, _>(idx)?),
            "FLOAT4" => Value::from(row.try_get::<f32, _>(idx)?),
            "FLOAT8" => Value::from(row.try_get::<f64, _>(idx)?),
            _ => Value::String(row.try_get::<String, _>(idx)?),
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p herdctl-server -- --ignored

    async fn driver() -> PostgresDriver {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let driver = PostgresDriver::connect(&url, 2).await.expect("connect failed");
        driver.init_schema().await.expect("schema failed");
        driver
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn init_schema_twice() {
        let driver = driver().await;
        driver.init_schema().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_returns_id_and_native_bool() {
        let driver = driver().await;
        let outcome = driver
            .execute(
                &Statement::insert(
                    r#"INSERT INTO breeding_records ("cowId", "birthRegistered") VALUES (?, ?)"#,
                ),
                &[Param::Int(None), Param::from(false)],
            )
            .await
            .unwrap();
        let id = outcome.generated_id.expect("generated id");

        let rows = driver
            .query(
                &Statement::read(r#"SELECT * FROM breeding_records WHERE "id" = ?"#),
                &[Param::from(id)],
            )
            .await
            .unwrap();
        assert_eq!(rows[0]["birthRegistered"], Value::Bool(false));
        assert_eq!(rows[0]["id"], Value::from(id));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_ear_tag_and_full_animal_row() {
        use crate::db::repos::{from_row, AnimalRepo, RepoError};
        use herdctl_core::{Animal, NewAnimal};

        let driver = driver().await;
        let repo = AnimalRepo::new(&driver);
        let tag = format!("PG-{}", chrono::Utc::now().timestamp_micros());

        let created = repo
            .create(NewAnimal {
                kind: Some("cow".into()),
                ear_tag: Some(tag.clone()),
                name: Some("Bella".into()),
                age: Some(3),
                birth_date: Some("2021-04-02".into()),
                breed: Some("Holstein".into()),
                gender: Some("female".into()),
                births: Some(2),
                notes: None,
            })
            .await
            .unwrap();

        let err = repo
            .create(NewAnimal {
                ear_tag: Some(tag.clone()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            RepoError::Storage(e) => assert!(e.is_duplicate_key(), "{e:?}"),
            other => panic!("expected storage error, got {other:?}"),
        }

        let rows = driver
            .query(
                &Statement::read(r#"SELECT * FROM animals WHERE "earTag" = ?"#),
                &[Param::from(tag.clone())],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["id"], Value::from(created.id));
        assert_eq!(row["age"], Value::from(3));
        assert_eq!(row["births"], Value::from(2));
        assert_eq!(row["type"], Value::from("cow"));
        assert_eq!(row["notes"], Value::Null);

        let animal: Animal = from_row("animals", row.clone()).unwrap();
        assert_eq!(animal, created);

        repo.delete_by_id(created.id).await.unwrap();
    }
}
