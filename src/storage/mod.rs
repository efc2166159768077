use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{
    AccessRecord, DailyVisitCount, FailedLoginOutcome, LinkAnalyticsSummary, PendingRegistration,
    ShortLink, UserAccount, VisitType,
};

pub struct StorageFactory;

impl StorageFactory {
    /// 根据 `[database]` 配置创建存储并运行迁移
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let database_url = backend::normalize_database_url(&config.database_url);

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&database_url)?;

        let storage = SeaOrmStorage::new(&database_url, &backend_type, config).await?;
        Ok(Arc::new(storage))
    }
}
