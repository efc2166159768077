use std::sync::Arc;

use actix_web::{HttpResponse, web};

use crate::api::middleware::SessionId;
use crate::errors::Result;
use crate::services::LinkService;

pub struct HistoryHandler;

impl HistoryHandler {
    /// GET /api/history
    pub async fn history(
        session: SessionId,
        links: web::Data<Arc<LinkService>>,
    ) -> Result<HttpResponse> {
        let items = links.history(session.as_str()).await?;
        Ok(HttpResponse::Ok().json(items))
    }
}
