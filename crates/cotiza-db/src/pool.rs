//! # Database Handle
//!
//! Opens the SQLite pool that backs the catalog, the project codes and the
//! quotation lines, and hands out one repository per table family.
//!
//! ```text
//!  CotizaConfig::db_config() ──► Database::new ──► migrations
//!                                     │
//!          ┌────────────┬─────────────┼─────────────┐
//!          ▼            ▼             ▼             ▼
//!     materials()  accessories()  projects()   quotations()
//! ```
//!
//! The journal runs in WAL mode so a discrepancy audit can read committed
//! lines while another quotation holds the write lock.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::accessory::AccessoryRepository;
use crate::repository::material::MaterialRepository;
use crate::repository::project::ProjectRepository;
use crate::repository::quotation::QuotationRepository;

const IN_MEMORY_PATH: &str = ":memory:";

/// Where the store lives and how many connections it may open.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    /// Default: 5. Forced to 1 for in-memory stores.
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    /// File-backed store; the file is created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Private store for tests. Every connection to `:memory:` is its own
    /// database, so the pool is capped at one connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }
}

/// Shared handle over the pool. Clones share the same connections.
///
/// ```rust,ignore
/// let db = Database::new(config.db_config()).await?;
/// let boards = db.materials().list_by_kind(MaterialKind::Tablero).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and brings the schema up to date.
    ///
    /// Foreign keys are switched on for every connection; `quotation_items`
    /// rows reference their project and must not outlive it.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening quotation store");

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        let max_connections = if config.is_in_memory() {
            1
        } else {
            config.max_connections
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections, "Pool ready");

        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    pub fn materials(&self) -> MaterialRepository {
        MaterialRepository::new(self.pool.clone())
    }

    pub fn accessories(&self) -> AccessoryRepository {
        AccessoryRepository::new(self.pool.clone())
    }

    pub fn projects(&self) -> ProjectRepository {
        ProjectRepository::new(self.pool.clone())
    }

    pub fn quotations(&self) -> QuotationRepository {
        QuotationRepository::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_applies_every_migration() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migrations::migration_status(&db.pool).await.unwrap();

        assert!(total >= 1);
        assert_eq!(total, applied);
        assert_eq!(db.projects().count().await.unwrap(), 0);
    }

    #[test]
    fn test_in_memory_is_single_connection() {
        let config = DbConfig::in_memory().max_connections(8);

        assert!(config.is_in_memory());
        assert!(!DbConfig::new("/tmp/cotiza.db").is_in_memory());
        assert_eq!(DbConfig::new("/tmp/cotiza.db").max_connections(10).max_connections, 10);
    }
}
