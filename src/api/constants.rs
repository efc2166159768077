//! API 模块常量定义

/// 默认会话 Cookie 名称
pub const SESSION_COOKIE_NAME: &str = "UTL_SESSION";

/// 请求 ID 响应头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 客户端传入的请求 ID 最大长度
pub const MAX_REQUEST_ID_LEN: usize = 64;

/// 请求体大小上限（字节）
pub const MAX_JSON_PAYLOAD: usize = 64 * 1024;

/// 管理接口前缀
pub const ADMIN_PREFIX: &str = "/admin";
