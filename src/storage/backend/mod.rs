//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod broadcast_stats;
mod connection;
mod counters;
mod messages;
mod orgs;
pub mod retry;

use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr};
use tracing::info;

use crate::errors::{MsgstatsError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use retry::{RetryConfig, StorageOp};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(MsgstatsError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: RetryConfig,
}

impl SeaOrmStorage {
    /// 连接数据库并运行迁移
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(MsgstatsError::database_config("database_url is not set"));
        }

        let config = crate::config::get_config();
        let retry_config = RetryConfig::from_database_config(&config.database);

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url, &config.database).await?
        } else {
            connect_generic(database_url, backend_name, &config.database).await?
        };

        run_migrations(&db).await?;

        info!("{} storage initialized", backend_name.to_uppercase());
        Ok(Self::from_connection(db, backend_name, retry_config))
    }

    /// 包装一个已建立的连接（不运行迁移）
    pub fn from_connection(
        db: DatabaseConnection,
        backend_name: &str,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        }
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    fn backend(&self) -> DatabaseBackend {
        use sea_orm::ConnectionTrait;
        self.db.get_database_backend()
    }

    async fn retry<T, F, Fut>(&self, op: StorageOp, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, DbErr>>,
    {
        retry::retry_storage(op, self.retry_config, operation).await
    }
}
