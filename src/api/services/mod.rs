//! HTTP handlers
//!
//! 每个 handler 只负责提取请求参数并调用 `crate::services` 中的业务逻辑。

pub mod admin;
pub mod auth;
pub mod health;
pub mod history;
pub mod qrcode;
pub mod redirect;
pub mod shorten;
pub mod stats;

use actix_web::{HttpRequest, web};

use crate::api::constants::ADMIN_PREFIX;
use crate::api::state::ApiSettings;
use crate::utils::extract_client_ip;

pub use admin::AdminHandler;
pub use auth::AuthHandler;
pub use health::HealthHandler;
pub use history::HistoryHandler;
pub use qrcode::QrCodeHandler;
pub use redirect::RedirectHandler;
pub use shorten::ShortenHandler;
pub use stats::StatsHandler;

/// 请求头中的 User-Agent
pub(crate) fn user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(String::from)
}

/// 客户端 IP（按受信代理规则解析转发头）
pub(crate) fn client_ip(req: &HttpRequest, settings: &ApiSettings) -> Option<String> {
    extract_client_ip(req, &settings.trusted_proxies)
}

/// 注册全部路由
///
/// `/{shortcode}` 必须最后注册，避免吞掉其它单段路径。
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/health")
            .route(web::get().to(HealthHandler::health))
            .route(web::head().to(HealthHandler::health)),
    )
    .route("/shorten", web::post().to(ShortenHandler::shorten))
    .route("/stats/{shortcode}", web::get().to(StatsHandler::stats))
    .service(
        web::scope("/api")
            .route("/history", web::get().to(HistoryHandler::history))
            .route("/qrcode", web::get().to(QrCodeHandler::qrcode))
            .route("/register", web::post().to(AuthHandler::register))
            .route("/verify-otp", web::post().to(AuthHandler::verify_otp))
            .route("/login", web::post().to(AuthHandler::login))
            .route("/logout", web::post().to(AuthHandler::logout))
            .route("/session", web::get().to(AuthHandler::session_status)),
    )
    .service(
        web::scope(ADMIN_PREFIX).route("/analytics", web::get().to(AdminHandler::daily_analytics)),
    )
    .route("/{shortcode}", web::get().to(RedirectHandler::redirect));
}
