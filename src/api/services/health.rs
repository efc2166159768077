use std::sync::Arc;
use std::time::Duration;

use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{error, trace};

use crate::storage::SeaOrmStorage;

/// 数据库检查超时
const HEALTH_DB_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HealthHandler;

impl HealthHandler {
    /// GET /health
    ///
    /// 数据库可用时返回 `{"status": "ok"}`，否则 503。
    pub async fn health(storage: web::Data<Arc<SeaOrmStorage>>) -> HttpResponse {
        match tokio::time::timeout(HEALTH_DB_TIMEOUT, storage.ping()).await {
            Ok(Ok(())) => {
                trace!("Health check passed");
                HttpResponse::Ok().json(json!({ "status": "ok" }))
            }
            Ok(Err(e)) => {
                error!("Health check failed: {}", e);
                HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
            }
            Err(_) => {
                error!("Health check timed out");
                HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
            }
        }
    }
}
