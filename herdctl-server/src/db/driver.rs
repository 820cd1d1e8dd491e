//! Storage driver contract shared by every backend
//!
//! Repositories write each statement once: positional `?` placeholders,
//! double-quoted identifiers, and no string literals (every value is bound).
//! Drivers translate that text to their own dialect, bind parameters, and
//! normalize result rows to JSON values.

use async_trait::async_trait;
use herdctl_core::Backend;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::{Database, Encode, Type};

/// One result row: column name -> normalized value
pub type Row = serde_json::Map<String, Value>;

/// What a statement does, which decides how its outcome is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns rows
    Read,
    /// Inserts one row and reports its generated `id`
    Insert,
    /// Update or delete; reports affected rows
    Write,
}

/// A backend-agnostic SQL statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement {
    sql: &'static str,
    kind: StatementKind,
}

impl Statement {
    pub const fn read(sql: &'static str) -> Self {
        Self {
            sql,
            kind: StatementKind::Read,
        }
    }

    pub const fn insert(sql: &'static str) -> Self {
        Self {
            sql,
            kind: StatementKind::Insert,
        }
    }

    pub const fn write(sql: &'static str) -> Self {
        Self {
            sql,
            kind: StatementKind::Write,
        }
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }
}

/// A positional parameter.
///
/// Nulls carry their column type so server backends can type the bind.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(Option<i64>),
    Text(Option<String>),
    Bool(bool),
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Self::Int(Some(v))
    }
}

impl From<Option<i64>> for Param {
    fn from(v: Option<i64>) -> Self {
        Self::Int(v)
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Self::Text(Some(v))
    }
}

impl From<Option<String>> for Param {
    fn from(v: Option<String>) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Outcome of a write statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    /// Primary key of the inserted row (inserts only)
    pub generated_id: Option<i64>,
    pub rows_affected: u64,
}

/// Uniform storage failure.
///
/// Callers above the repository layer treat every variant the same way;
/// the split only records what the backend reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// A uniqueness constraint rejected the write
    #[error("{message}")]
    DuplicateKey { message: String },

    /// Connectivity, syntax, or any other backend failure
    #[error("{message}")]
    Backend { message: String },

    /// A column value could not be converted to JSON
    #[error("{message}")]
    Decode { message: String },
}

impl StorageError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::DuplicateKey { message } | Self::Backend { message } | Self::Decode { message } => {
                message
            }
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::DuplicateKey {
                message: db.message().to_string(),
            },
            sqlx::Error::Database(db) => Self::Backend {
                message: db.message().to_string(),
            },
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => Self::Decode {
                message: err.to_string(),
            },
            _ => Self::Backend {
                message: err.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::backend(err.to_string())
    }
}

/// A storage backend. One instance is opened at startup and shared by all
/// requests.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Which engine this driver talks to
    fn backend(&self) -> Backend;

    /// Create both tables if absent. Safe to call on every start.
    async fn init_schema(&self) -> Result<(), StorageError>;

    /// Run a read statement and return all rows
    async fn query(&self, statement: &Statement, params: &[Param]) -> Result<Vec<Row>, StorageError>;

    /// Run an insert, update or delete
    async fn execute(
        &self,
        statement: &Statement,
        params: &[Param],
    ) -> Result<ExecOutcome, StorageError>;

    /// Release pooled connections
    async fn close(&self);
}

/// Bind every parameter in order
pub(crate) fn bind_params<'q, DB>(
    mut query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    params: &[Param],
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    Option<i64>: Encode<'q, DB> + Type<DB>,
    Option<String>: Encode<'q, DB> + Type<DB>,
    bool: Encode<'q, DB> + Type<DB>,
{
    for param in params {
        query = match param {
            Param::Int(v) => query.bind(*v),
            Param::Text(v) => query.bind(v.clone()),
            Param::Bool(v) => query.bind(*v),
        };
    }
    query
}

/// `?` -> `$1`, `$2`, ... for PostgreSQL
pub(crate) fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0;
    for ch in sql.chars() {
        if ch == '?' {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `"ident"` -> `` `ident` `` for MySQL without ANSI_QUOTES
pub(crate) fn backtick_identifiers(sql: &str) -> String {
    sql.replace('"', "`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_placeholders_in_order() {
        assert_eq!(
            numbered_placeholders(r#"UPDATE t SET "a" = ?, "b" = ? WHERE "id" = ?"#),
            r#"UPDATE t SET "a" = $1, "b" = $2 WHERE "id" = $3"#
        );
        assert_eq!(numbered_placeholders("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn backticks_identifiers() {
        assert_eq!(
            backtick_identifiers(r#"SELECT * FROM animals WHERE "earTag" = ?"#),
            "SELECT * FROM animals WHERE `earTag` = ?"
        );
    }

    #[test]
    fn statement_kinds() {
        const S: Statement = Statement::insert("INSERT INTO t VALUES (?)");
        assert_eq!(S.kind(), StatementKind::Insert);
        assert_eq!(Statement::read("SELECT 1").kind(), StatementKind::Read);
    }

    #[test]
    fn params_from_values() {
        assert_eq!(Param::from(5_i64), Param::Int(Some(5)));
        assert_eq!(Param::from(None::<String>), Param::Text(None));
        assert_eq!(Param::from(true), Param::Bool(true));
    }

    #[test]
    fn storage_error_message_is_backend_text() {
        let err = StorageError::DuplicateKey {
            message: "UNIQUE constraint failed: animals.earTag".into(),
        };
        assert_eq!(err.to_string(), "UNIQUE constraint failed: animals.earTag");
        assert!(err.is_duplicate_key());
        assert!(!StorageError::backend("down").is_duplicate_key());
    }
}
