use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

#[derive(Debug, Clone)]
pub enum UseThisLinkError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    ShortCodeExhausted(String),
    Mail(String),
    Serialization(String),
    Internal(String),
}

impl UseThisLinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            UseThisLinkError::Validation(_) => "E001",
            UseThisLinkError::NotFound(_) => "E002",
            UseThisLinkError::Conflict(_) => "E003",
            UseThisLinkError::Unauthorized(_) => "E004",
            UseThisLinkError::Forbidden(_) => "E005",
            UseThisLinkError::DatabaseConfig(_) => "E006",
            UseThisLinkError::DatabaseConnection(_) => "E007",
            UseThisLinkError::DatabaseOperation(_) => "E008",
            UseThisLinkError::ShortCodeExhausted(_) => "E009",
            UseThisLinkError::Mail(_) => "E010",
            UseThisLinkError::Serialization(_) => "E011",
            UseThisLinkError::Internal(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            UseThisLinkError::Validation(_) => "Validation Error",
            UseThisLinkError::NotFound(_) => "Resource Not Found",
            UseThisLinkError::Conflict(_) => "Conflict",
            UseThisLinkError::Unauthorized(_) => "Unauthorized",
            UseThisLinkError::Forbidden(_) => "Forbidden",
            UseThisLinkError::DatabaseConfig(_) => "Database Configuration Error",
            UseThisLinkError::DatabaseConnection(_) => "Database Connection Error",
            UseThisLinkError::DatabaseOperation(_) => "Database Operation Error",
            UseThisLinkError::ShortCodeExhausted(_) => "Short Code Exhausted",
            UseThisLinkError::Mail(_) => "Mail Delivery Error",
            UseThisLinkError::Serialization(_) => "Serialization Error",
            UseThisLinkError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            UseThisLinkError::Validation(msg)
            | UseThisLinkError::NotFound(msg)
            | UseThisLinkError::Conflict(msg)
            | UseThisLinkError::Unauthorized(msg)
            | UseThisLinkError::Forbidden(msg)
            | UseThisLinkError::DatabaseConfig(msg)
            | UseThisLinkError::DatabaseConnection(msg)
            | UseThisLinkError::DatabaseOperation(msg)
            | UseThisLinkError::ShortCodeExhausted(msg)
            | UseThisLinkError::Mail(msg)
            | UseThisLinkError::Serialization(msg)
            | UseThisLinkError::Internal(msg) => msg,
        }
    }

    /// 格式化为彩色输出（启动失败时打印到终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 返回给客户端的消息
    ///
    /// 5xx 错误只返回通用描述，细节写日志。
    pub fn public_message(&self) -> &str {
        match self {
            UseThisLinkError::ShortCodeExhausted(_) => {
                "Could not generate a unique short URL. Please try again."
            }
            UseThisLinkError::Mail(_) => "Failed to send OTP email",
            UseThisLinkError::DatabaseConfig(_)
            | UseThisLinkError::DatabaseConnection(_)
            | UseThisLinkError::DatabaseOperation(_)
            | UseThisLinkError::Serialization(_)
            | UseThisLinkError::Internal(_) => "Internal server error",
            other => other.message(),
        }
    }
}

impl fmt::Display for UseThisLinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for UseThisLinkError {}

// 便捷的构造函数
impl UseThisLinkError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::Conflict(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::Forbidden(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::DatabaseOperation(msg.into())
    }

    pub fn short_code_exhausted<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::ShortCodeExhausted(msg.into())
    }

    pub fn mail<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::Mail(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::Serialization(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        UseThisLinkError::Internal(msg.into())
    }
}

impl ResponseError for UseThisLinkError {
    fn status_code(&self) -> StatusCode {
        match self {
            UseThisLinkError::Validation(_) => StatusCode::BAD_REQUEST,
            UseThisLinkError::NotFound(_) => StatusCode::NOT_FOUND,
            UseThisLinkError::Conflict(_) => StatusCode::CONFLICT,
            UseThisLinkError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            UseThisLinkError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{} [{}]: {}", self.error_type(), self.code(), self.message());
        }
        HttpResponse::build(status).json(json!({ "error": self.public_message() }))
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for UseThisLinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        UseThisLinkError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for UseThisLinkError {
    fn from(err: serde_json::Error) -> Self {
        UseThisLinkError::Serialization(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for UseThisLinkError {
    fn from(err: argon2::password_hash::Error) -> Self {
        UseThisLinkError::Internal(format!("password hashing failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, UseThisLinkError>;
