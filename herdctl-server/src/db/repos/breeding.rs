//! Breeding record repository
//!
//! Records start unregistered; `register_birth` is the only mutation and
//! keeps `birthRegistered` and `actualBirthDate` in step.

use chrono::Utc;
use herdctl_core::{iso_timestamp, BirthStatus, BreedingRecord, Deleted, NewBreedingRecord};

use super::{from_row, RepoError};
use crate::db::driver::{Param, Statement, StorageDriver, StorageError};

const TABLE: &str = "breeding_records";

const LIST: Statement = Statement::read("SELECT * FROM breeding_records");

const GET: Statement = Statement::read(r#"SELECT * FROM breeding_records WHERE "id" = ?"#);

const INSERT: Statement = Statement::insert(
    r#"
    INSERT INTO breeding_records ("cowId", "bullId", "breedingDate", "expectedBirthDate", "registeredDate", "birthRegistered")
    VALUES (?, ?, ?, ?, ?, ?)
    "#,
);

const SET_BIRTH: Statement = Statement::write(
    r#"UPDATE breeding_records SET "birthRegistered" = ?, "actualBirthDate" = ? WHERE "id" = ?"#,
);

const DELETE: Statement = Statement::write(r#"DELETE FROM breeding_records WHERE "id" = ?"#);

/// Breeding record repository
pub struct BreedingRepo<'a> {
    driver: &'a dyn StorageDriver,
}

impl<'a> BreedingRepo<'a> {
    pub fn new(driver: &'a dyn StorageDriver) -> Self {
        Self { driver }
    }

    /// All breeding records in storage order.
    pub async fn list(&self) -> Result<Vec<BreedingRecord>, RepoError> {
        self.driver
            .query(&LIST, &[])
            .await?
            .into_iter()
            .map(|row| from_row(TABLE, row))
            .collect()
    }

    /// Single record by id.
    pub async fn get(&self, id: i64) -> Result<Option<BreedingRecord>, RepoError> {
        let row = self.driver.query(&GET, &[Param::from(id)]).await?.into_iter().next();
        row.map(|row| from_row(TABLE, row)).transpose()
    }

    /// Record a breeding. The birth is always unregistered at this point.
    pub async fn create(&self, record: NewBreedingRecord) -> Result<BreedingRecord, RepoError> {
        let params = [
            Param::from(record.cow_id),
            Param::from(record.bull_id),
            Param::from(record.breeding_date),
            Param::from(record.expected_birth_date),
            Param::from(iso_timestamp(Utc::now())),
            Param::from(false),
        ];

        let outcome = self.driver.execute(&INSERT, &params).await?;
        let id = outcome
            .generated_id
            .ok_or_else(|| StorageError::backend("insert reported no generated id"))?;

        tracing::debug!(id, "breeding record created");
        self.get(id)
            .await?
            .ok_or(RepoError::Vanished { table: TABLE, id })
    }

    /// Register or clear the birth, then return the row as stored.
    ///
    /// An unknown id updates nothing and yields `None`.
    pub async fn register_birth(
        &self,
        id: i64,
        status: BirthStatus,
    ) -> Result<Option<BreedingRecord>, RepoError> {
        let params = [
            Param::from(status.is_registered()),
            Param::from(status.actual_birth_date().map(str::to_owned)),
            Param::from(id),
        ];

        let outcome = self.driver.execute(&SET_BIRTH, &params).await?;
        tracing::debug!(
            id,
            registered = status.is_registered(),
            rows = outcome.rows_affected,
            "birth status updated"
        );

        self.get(id).await
    }

    /// Remove a breeding record.
    pub async fn delete_by_id(&self, id: i64) -> Result<Deleted, RepoError> {
        let outcome = self.driver.execute(&DELETE, &[Param::from(id)]).await?;
        Ok(Deleted {
            deleted: outcome.rows_affected,
        })
    }
}
