//! Table definitions for each backend
//!
//! Column names are camelCase and quoted so PostgreSQL keeps their case.
//! Every statement is `CREATE TABLE IF NOT EXISTS`.

use herdctl_core::Backend;

use super::driver::{StorageDriver, StorageError};

const SQLITE: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS animals (
        "id" INTEGER PRIMARY KEY AUTOINCREMENT,
        "type" TEXT,
        "earTag" TEXT UNIQUE,
        "name" TEXT,
        "age" INTEGER,
        "birthDate" TEXT,
        "breed" TEXT,
        "gender" TEXT,
        "births" INTEGER,
        "notes" TEXT,
        "registrationDate" TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS breeding_records (
        "id" INTEGER PRIMARY KEY AUTOINCREMENT,
        "cowId" INTEGER,
        "bullId" INTEGER,
        "breedingDate" TEXT,
        "expectedBirthDate" TEXT,
        "registeredDate" TEXT,
        "birthRegistered" BOOLEAN DEFAULT 0,
        "actualBirthDate" TEXT
    )
    "#,
];

const POSTGRES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS animals (
        "id" BIGSERIAL PRIMARY KEY,
        "type" TEXT,
        "earTag" TEXT UNIQUE,
        "name" TEXT,
        "age" BIGINT,
        "birthDate" TEXT,
        "breed" TEXT,
        "gender" TEXT,
        "births" BIGINT,
        "notes" TEXT,
        "registrationDate" TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS breeding_records (
        "id" BIGSERIAL PRIMARY KEY,
        "cowId" BIGINT,
        "bullId" BIGINT,
        "breedingDate" TEXT,
        "expectedBirthDate" TEXT,
        "registeredDate" TEXT,
        "birthRegistered" BOOLEAN DEFAULT FALSE,
        "actualBirthDate" TEXT
    )
    "#,
];

// UNIQUE needs a bounded key length, hence VARCHAR for earTag
const MYSQL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS animals (
        `id` BIGINT AUTO_INCREMENT PRIMARY KEY,
        `type` TEXT,
        `earTag` VARCHAR(255) UNIQUE,
        `name` TEXT,
        `age` BIGINT,
        `birthDate` TEXT,
        `breed` TEXT,
        `gender` TEXT,
        `births` BIGINT,
        `notes` TEXT,
        `registrationDate` TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS breeding_records (
        `id` BIGINT AUTO_INCREMENT PRIMARY KEY,
        `cowId` BIGINT,
        `bullId` BIGINT,
        `breedingDate` TEXT,
        `expectedBirthDate` TEXT,
        `registeredDate` TEXT,
        `birthRegistered` BOOLEAN DEFAULT FALSE,
        `actualBirthDate` TEXT
    )
    "#,
];

/// DDL for `backend`, in execution order
pub fn statements(backend: Backend) -> &'static [&'static str] {
    match backend {
        Backend::Sqlite => SQLITE,
        Backend::Postgres => POSTGRES,
        Backend::MySql => MYSQL,
    }
}

/// Ensure both tables exist. Runs once at startup, before the listener binds.
pub async fn init(driver: &dyn StorageDriver) -> Result<(), StorageError> {
    tracing::info!(backend = %driver.backend(), "Initializing schema...");
    driver.init_schema().await?;
    tracing::info!("schema ready");
    Ok(())
}
