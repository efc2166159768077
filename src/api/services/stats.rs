use std::sync::Arc;

use actix_web::{HttpResponse, web};

use crate::errors::Result;
use crate::services::LinkService;

pub struct StatsHandler;

impl StatsHandler {
    /// GET /stats/{shortcode}
    pub async fn stats(
        path: web::Path<String>,
        links: web::Data<Arc<LinkService>>,
    ) -> Result<HttpResponse> {
        let stats = links.stats(&path.into_inner()).await?;
        Ok(HttpResponse::Ok().json(stats))
    }
}
