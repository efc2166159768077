use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, http::header::LOCATION, web};
use tracing::{error, trace};

use super::{client_ip, user_agent};
use crate::api::middleware::SessionId;
use crate::api::state::ApiSettings;
use crate::errors::Result;
use crate::services::user_agent::is_bot;
use crate::services::{AnalyticsService, LinkService, VisitContext};
use crate::storage::VisitType;

pub struct RedirectHandler;

impl RedirectHandler {
    /// GET /{shortcode}
    ///
    /// 爬虫直接跳转，不计数也不记录访问。
    pub async fn redirect(
        req: HttpRequest,
        path: web::Path<String>,
        session: SessionId,
        links: web::Data<Arc<LinkService>>,
        analytics: web::Data<Arc<AnalyticsService>>,
        settings: web::Data<Arc<ApiSettings>>,
    ) -> Result<HttpResponse> {
        let code = path.into_inner();
        let link = links.resolve(&code).await?;

        let ua = user_agent(&req);
        if ua.as_deref().is_some_and(is_bot) {
            trace!("Bot visit to {} not counted", code);
            return Ok(Self::found(&link.original_url));
        }

        // 计数失败不影响跳转
        if let Err(e) = links.record_visit(&code).await {
            error!("Failed to increment visits for {}: {}", code, e);
        }

        let referrer = req
            .headers()
            .get("referer")
            .and_then(|h| h.to_str().ok())
            .map(String::from);

        analytics.spawn_record(VisitContext {
            code,
            session_id: Some(session.id),
            ip_address: client_ip(&req, &settings),
            user_agent: ua,
            referrer,
            visit_type: VisitType::Redirect,
        });

        Ok(Self::found(&link.original_url))
    }

    #[inline]
    fn found(target: &str) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((LOCATION, target))
            .finish()
    }
}
