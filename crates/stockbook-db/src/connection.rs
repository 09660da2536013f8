//! SurrealDB connection management.

use std::env;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "stockbook".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Builds a configuration from `STOCKBOOK_DB_*` environment variables,
    /// falling back to the defaults for any that are unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env::var("STOCKBOOK_DB_URL").unwrap_or(defaults.url),
            namespace: env::var("STOCKBOOK_DB_NS").unwrap_or(defaults.namespace),
            database: env::var("STOCKBOOK_DB_NAME").unwrap_or(defaults.database),
            username: env::var("STOCKBOOK_DB_USER").unwrap_or(defaults.username),
            password: env::var("STOCKBOOK_DB_PASS").unwrap_or(defaults.password),
        }
    }
}

/// Manages the lifetime of a SurrealDB connection.
///
/// Constructed once at process start and injected wherever storage access
/// is needed; there is no process-global client.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect to SurrealDB using the provided configuration.
    ///
    /// Authenticates as root, selects the configured namespace and
    /// database, and returns a ready-to-use manager.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Successfully connected to SurrealDB");

        Ok(Self { db })
    }

    /// Verifies the connection end to end with a trivial query.
    pub async fn health_check(&self) -> Result<(), DbError> {
        self.db.query("RETURN 1").await?.check()?;
        Ok(())
    }

    /// Releases the connection. The manager cannot be used afterwards.
    pub async fn close(self) {
        info!("Closing SurrealDB connection");
        drop(self.db);
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
