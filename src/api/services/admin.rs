use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use subtle::ConstantTimeEq;
use tracing::info;

use crate::api::state::ApiSettings;
use crate::errors::{Result, UseThisLinkError};
use crate::services::AnalyticsService;

pub struct AdminHandler;

impl AdminHandler {
    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &HttpRequest) -> Option<&str> {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::trim)
    }

    /// token 未配置时接口不存在；token 不匹配返回 401
    fn authorize(req: &HttpRequest, settings: &ApiSettings) -> Result<()> {
        if settings.admin_token.is_empty() {
            return Err(UseThisLinkError::not_found("Not Found"));
        }

        let authorized = Self::extract_bearer_token(req)
            .map(|token| bool::from(token.as_bytes().ct_eq(settings.admin_token.as_bytes())))
            .unwrap_or(false);

        if !authorized {
            info!("Admin authentication failed - invalid or missing token");
            return Err(UseThisLinkError::unauthorized("Unauthorized"));
        }
        Ok(())
    }

    /// GET /admin/analytics
    pub async fn daily_analytics(
        req: HttpRequest,
        analytics: web::Data<Arc<AnalyticsService>>,
        settings: web::Data<Arc<ApiSettings>>,
    ) -> Result<HttpResponse> {
        Self::authorize(&req, &settings)?;
        let days = analytics.daily_visits().await?;
        Ok(HttpResponse::Ok().json(days))
    }
}
