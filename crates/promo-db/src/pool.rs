//! # Database Pool Management
//!
//! Opens the SQLite pool the promotions service runs on and hands out
//! repositories over it.
//!
//! ## Who Holds Connections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   SqlitePool (max_connections)                          │
//! │                                                                         │
//! │  validate_coupon  ──► short reads, one connection per query             │
//! │  apply_coupon     ──► reads, then ONE write transaction (redemption)    │
//! │  request_transition ► single guarded UPDATE                             │
//! │  sweeper          ──► three bulk guarded UPDATEs per pass               │
//! │                                                                         │
//! │  SQLite allows one writer at a time. Concurrent redemptions queue on    │
//! │  the write lock for up to `busy_timeout` before the store gives up.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Connection Settings
//! - WAL journal: checkout reads are not blocked by a redemption in flight
//! - `synchronous = NORMAL`
//! - foreign keys on, so coupons and daily stats cannot outlive their campaign

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::campaign::CampaignRepository;
use crate::repository::coupon::CouponRepository;
use crate::repository::order::OrderRepository;
use crate::repository::redemption::RedemptionRepository;
use crate::repository::stats::StatsRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use promo_db::DbConfig;
///
/// let config = DbConfig::new("/var/lib/promo/promo.db").max_connections(8);
/// assert_eq!(config.max_connections, 8);
/// assert!(config.run_migrations);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created when missing. `:memory:` for tests.
    pub database_path: PathBuf,

    /// Pool size. Default: 5
    pub max_connections: u32,

    /// Connections kept open while idle. Default: 1
    pub min_connections: u32,

    /// How long a caller waits for a free connection. Default: 30 seconds
    pub connect_timeout: Duration,

    /// How long a writer waits on SQLite's write lock. Default: 5 seconds
    pub busy_timeout: Duration,

    /// Idle connections above `min_connections` are closed after this.
    pub idle_timeout: Duration,

    /// Apply embedded migrations on open. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Configuration for a database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Private in-memory database for tests.
    ///
    /// Exactly one connection: every new SQLite connection to `:memory:`
    /// would see its own empty database. Callers must therefore never hold a
    /// transaction open while issuing other queries through the pool.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the promotions database.
///
/// Cheap to clone: every clone shares the same pool. Repositories are
/// created per call and hold their own pool handle.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies pending migrations.
    ///
    /// ## Returns
    /// * `Ok(Database)` - ready to use
    /// * `Err(DbError::ConnectionFailed)` - bad path or unreadable file
    /// * `Err(DbError::MigrationFailed)` - schema could not be brought up to date
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening promotions database");

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        debug!(
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Connection options configured"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Database pool created");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending embedded migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Campaign CRUD, transitions, telemetry and sweeps.
    pub fn campaigns(&self) -> CampaignRepository {
        CampaignRepository::new(self.pool.clone())
    }

    pub fn coupons(&self) -> CouponRepository {
        CouponRepository::new(self.pool.clone())
    }

    /// Order reads and the discount annotation.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// The atomic redemption commit.
    pub fn redemptions(&self) -> RedemptionRepository {
        RedemptionRepository::new(self.pool.clone())
    }

    pub fn stats(&self) -> StatsRepository {
        StatsRepository::new(self.pool.clone())
    }

    /// Closes the pool. Later repository calls fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks that a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
