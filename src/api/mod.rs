pub mod constants;
pub mod middleware;
pub mod services;
pub mod state;

pub use services::configure_routes;
pub use state::{ApiSettings, AppState};

use actix_web::web;

/// 注册共享状态、请求体限制以及全部路由
pub fn configure_app(cfg: &mut web::ServiceConfig, state: &AppState) {
    state.register(cfg);
    cfg.app_data(
        web::JsonConfig::default()
            .limit(constants::MAX_JSON_PAYLOAD)
            .content_type_required(false),
    );
    configure_routes(cfg);
}
