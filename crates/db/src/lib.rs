//! Chatlink persistence.
//!
//! [`store`] defines the storage seams the bot depends on. Two
//! implementations exist: [`pg::PgStore`] (PostgreSQL via the sqlx
//! [`repositories`]) and [`memory::MemoryStore`], which keeps the same
//! atomicity guarantees in process and backs the test suites.

pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::{
    ChatStore, Directory, HealthCheck, IdentityLinkStore, LinkingCodeStore, StoreError,
    StoreResult, Stores, UpdateLog,
};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify connectivity.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
