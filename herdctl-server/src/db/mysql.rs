//! MySQL backend
//!
//! Identifiers are re-quoted with backticks. BOOLEAN columns are
//! `TINYINT(1)` on the wire and come back as JSON booleans.

use async_trait::async_trait;
use herdctl_core::{Backend, MySqlConfig};
use serde_json::Value;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use super::driver::{
    backtick_identifiers, bind_params, ExecOutcome, Param, Row, Statement, StatementKind,
    StorageDriver, StorageError,
};
use super::schema;

/// Pooled MySQL driver
pub struct MySqlDriver {
    pool: MySqlPool,
}

impl MySqlDriver {
    /// Connect with discrete host/user/database settings. Fails if the
    /// server is unreachable.
    pub async fn connect(config: &MySqlConfig, max_connections: u32) -> Result<Self, StorageError> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl StorageDriver for MySqlDriver {
    fn backend(&self) -> Backend {
        Backend::MySql
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        for ddl in schema::statements(Backend::MySql) {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn query(&self, statement: &Statement, params: &[Param]) -> Result<Vec<Row>, StorageError> {
        let sql = backtick_identifiers(statement.sql());
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
        let sql = backtick_identifiers(statement.sql());
        let result = bind_params(sqlx::query(&sql), params)
            .execute(&self.pool)
            .await?;

        let generated_id = if statement.kind() == StatementKind::Insert {
            let id = i64::try_from(result.last_insert_id())
                .map_err(|_| StorageError::backend("generated id out of range"))?;
            Some(id)
        } else {
            None
        };

        Ok(ExecOutcome {
            generated_id,
            rows_affected: result.rows_affected(),
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn decode_row(row: &MySqlRow) -> Result<Row, StorageError> {
    let mut out = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        if row.try_get_raw(idx)?.is_null() {
            out.insert(column.name().to_string(), Value::Null);
            continue;
        }
        let type_name = column.type_info().name();
        let value = match type_name {
            "BOOLEAN" => Value::Bool(row.try_get::<bool, _>(idx)?),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                Value::from(row.try_get::<i64, _>(idx)?)
            }
            name if name.ends_with("UNSIGNED") => Value::from(row.try_get::<u64, _>(idx)?),
            "FLOAT" => Value::from(row.try_get::<f32, _>(idx)?),
            "DOUBLE" => Value::from(row.try_get::<f64, _>(idx)?),
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
                Value::String(String::from_utf8_lossy(&row.try_get::<Vec<u8>, _>(idx)?).into_owned())
            }
            _ => Value::String(row.try_get::<String, _>(idx)?),
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}
