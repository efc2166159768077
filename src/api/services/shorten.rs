use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{client_ip, user_agent};
use crate::api::middleware::SessionId;
use crate::api::state::ApiSettings;
use crate::errors::{Result, UseThisLinkError};
use crate::services::{ClientContext, LinkService, MSG_INVALID_BODY};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub original_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
}

pub struct ShortenHandler;

impl ShortenHandler {
    /// POST /shorten
    pub async fn shorten(
        req: HttpRequest,
        session: SessionId,
        body: std::result::Result<web::Json<ShortenRequest>, actix_web::Error>,
        links: web::Data<Arc<LinkService>>,
        settings: web::Data<Arc<ApiSettings>>,
    ) -> Result<HttpResponse> {
        let body = body.map_err(|_| UseThisLinkError::validation(MSG_INVALID_BODY))?;

        let ua = user_agent(&req);
        let ip = client_ip(&req, &settings);
        let short_url = links
            .shorten(
                session.as_str(),
                body.original_url.as_deref(),
                ClientContext {
                    user_agent: ua.as_deref(),
                    ip_address: ip.as_deref(),
                },
            )
            .await?;

        info!("Shortened for session {}: {}", session.id, short_url);
        Ok(HttpResponse::Ok().json(ShortenResponse { short_url }))
    }
}
