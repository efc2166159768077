//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod analytics;
mod connection;
pub mod converters;
mod links;
pub mod retry;
mod sessions;
mod users;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, sea_query::Expr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, UseThisLinkError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
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
        Err(UseThisLinkError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 把裸文件路径（例如旧版 DB_PATH=./urls.db）补全为 sqlite:// URL
pub fn normalize_database_url(database_url: &str) -> String {
    let trimmed = database_url.trim();
    if trimmed == ":memory:" {
        return "sqlite::memory:".to_string();
    }
    if trimmed.contains("://") || trimmed.starts_with("sqlite:") {
        return trimmed.to_string();
    }
    if trimmed.ends_with(".db") || trimmed.ends_with(".sqlite") {
        return format!("sqlite://{}", trimmed);
    }
    trimmed.to_string()
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// 重试配置
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(
        database_url: &str,
        backend_name: &str,
        config: &DatabaseConfig,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(UseThisLinkError::database_config(
                "database_url 未设置".to_string(),
            ));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, config).await?
        };

        let storage = Self::from_connection(db, backend_name, retry::RetryConfig::from(config));

        // 运行迁移
        run_migrations(&storage.db).await?;

        info!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// 使用已建立的连接构造（迁移由调用方负责）
    pub fn from_connection(
        db: DatabaseConnection,
        backend_name: &str,
        retry_config: retry::RetryConfig,
    ) -> Self {
        SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        }
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn get_backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 健康检查用的最小查询
    pub async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| UseThisLinkError::database_connection(format!("数据库不可用: {}", e)))
    }

    /// 按天格式化时间列的表达式（各数据库方言不同）
    fn day_expr(&self, column: &str) -> Expr {
        match self.db.get_database_backend() {
            DbBackend::Sqlite => Expr::cust(format!("strftime('%Y-%m-%d', {})", column)),
            DbBackend::MySql => Expr::cust(format!("DATE_FORMAT({}, '%Y-%m-%d')", column)),
            _ => Expr::cust(format!("TO_CHAR({}, 'YYYY-MM-DD')", column)),
        }
    }
}
