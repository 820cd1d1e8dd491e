//! Animal repository
//!
//! - create: INSERT, then re-read by generated id
//! - delete: reports 0 or 1, a miss is not an error
//! - list: storage order, no ORDER BY

use chrono::Utc;
use herdctl_core::{iso_timestamp, Animal, Deleted, NewAnimal};

use super::{from_row, RepoError};
use crate::db::driver::{Param, Statement, StorageDriver, StorageError};

const TABLE: &str = "animals";

const LIST: Statement = Statement::read("SELECT * FROM animals");

const GET: Statement = Statement::read(r#"SELECT * FROM animals WHERE "id" = ?"#);

const INSERT: Statement = Statement::insert(
    r#"
    INSERT INTO animals ("type", "earTag", "name", "age", "birthDate", "breed", "gender", "births", "notes", "registrationDate")
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#,
);

const DELETE: Statement = Statement::write(r#"DELETE FROM animals WHERE "id" = ?"#);

/// Animal repository
pub struct AnimalRepo<'a> {
    driver: &'a dyn StorageDriver,
}

impl<'a> AnimalRepo<'a> {
    pub fn new(driver: &'a dyn StorageDriver) -> Self {
        Self { driver }
    }

    /// All animals in storage order.
    pub async fn list(&self) -> Result<Vec<Animal>, RepoError> {
        self.driver
            .query(&LIST, &[])
            .await?
            .into_iter()
            .map(|row| from_row(TABLE, row))
            .collect()
    }

    /// Single animal by id.
    pub async fn get(&self, id: i64) -> Result<Option<Animal>, RepoError> {
        let row = self.driver.query(&GET, &[Param::from(id)]).await?.into_iter().next();
        row.map(|row| from_row(TABLE, row)).transpose()
    }

    /// Register a new animal stamped with the current time.
    ///
    /// A duplicate `earTag` fails with [`StorageError::DuplicateKey`] and
    /// adds no row.
    pub async fn create(&self, animal: NewAnimal) -> Result<Animal, RepoError> {
        let params = [
            Param::from(animal.kind),
            Param::from(animal.ear_tag),
            Param::from(animal.name),
            Param::from(animal.age),
            Param::from(animal.birth_date),
            Param::from(animal.breed),
            Param::from(animal.gender),
            Param::from(animal.births),
            Param::from(animal.notes),
            Param::from(iso_timestamp(Utc::now())),
        ];

        let outcome = self.driver.execute(&INSERT, &params).await?;
        let id = outcome
            .generated_id
            .ok_or_else(|| StorageError::backend("insert reported no generated id"))?;

        tracing::debug!(id, "animal created");
        self.get(id)
            .await?
            .ok_or(RepoError::Vanished { table: TABLE, id })
    }

    /// Remove an animal. Breeding records that reference it are left alone.
    pub async fn delete_by_id(&self, id: i64) -> Result<Deleted, RepoError> {
        let outcome = self.driver.execute(&DELETE, &[Param::from(id)]).await?;
        Ok(Deleted {
            deleted: outcome.rows_affected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteDriver;

    async fn driver() -> SqliteDriver {
        let driver = SqliteDriver::open_in_memory().await.unwrap();
        driver.init_schema().await.unwrap();
        driver
    }

    fn cow(tag: &str) -> NewAnimal {
        NewAnimal {
            kind: Some("cow".into()),
            ear_tag: Some(tag.into()),
            name: Some("Bella".into()),
            age: Some(4),
            births: Some(2),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let driver = driver().await;
        let repo = AnimalRepo::new(&driver);

        let created = repo.create(cow("NL-001")).await.unwrap();
        assert_eq!(created.ear_tag.as_deref(), Some("NL-001"));
        assert_eq!(created.age, Some(4));
        assert!(created
            .registration_date
            .as_deref()
            .is_some_and(|d| d.ends_with('Z')));

        let all = repo.list().await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn duplicate_ear_tag_is_rejected() {
        let driver = driver().await;
        let repo = AnimalRepo::new(&driver);

        repo.create(cow("NL-002")).await.unwrap();
        let err = repo.create(cow("NL-002")).await.unwrap_err();

        let RepoError::Storage(storage) = &err else {
            panic!("expected storage error, got {err:?}");
        };
        assert!(storage.message().contains("UNIQUE"));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn animals_without_ear_tags_do_not_collide() {
        let driver = driver().await;
        let repo = AnimalRepo::new(&driver);

        repo.create(NewAnimal::default()).await.unwrap();
        repo.create(NewAnimal::default()).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_reports_count() {
        let driver = driver().await;
        let repo = AnimalRepo::new(&driver);

        let created = repo.create(cow("NL-003")).await.unwrap();
        assert_eq!(repo.delete_by_id(created.id).await.unwrap(), Deleted { deleted: 1 });
        assert_eq!(repo.delete_by_id(created.id).await.unwrap(), Deleted { deleted: 0 });
        assert_eq!(repo.delete_by_id(4242).await.unwrap(), Deleted { deleted: 0 });
        assert!(repo.get(created.id).await.unwrap().is_none());
    }
}
