use std::sync::Arc;

use crate::errors::Result;

pub mod backend;

pub use backend::{RetryConfig, SeaOrmStorage};

pub struct StorageFactory;

impl StorageFactory {
    /// 按全局配置连接数据库并运行迁移
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let database_url = &config.database.database_url;

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = SeaOrmStorage::new(database_url, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
