use actix_web::{
    HttpResponse,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    web,
};
use serde::Deserialize;

use crate::errors::{Result, UseThisLinkError};
use crate::services::qrcode::render_png;

#[derive(Debug, Deserialize)]
pub struct QrQuery {
    #[serde(default)]
    pub data: Option<String>,
}

pub struct QrCodeHandler;

impl QrCodeHandler {
    /// GET /api/qrcode?data=...
    pub async fn qrcode(query: web::Query<QrQuery>) -> Result<HttpResponse> {
        let data = query
            .data
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| UseThisLinkError::validation("Missing data parameter"))?;

        let png = render_png(data)?;

        Ok(HttpResponse::Ok()
            .insert_header((CONTENT_TYPE, "image/png"))
            .insert_header((CACHE_CONTROL, "no-store"))
            .body(png))
    }
}
