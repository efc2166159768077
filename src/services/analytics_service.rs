//! 访问分析
//!
//! 每次非爬虫重定向在后台任务中记录：解析 UA、定位 IP，
//! 写入 url_access_logs 并累加 link_analytics。记录失败只写日志。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};

use super::geoip::GeoIpProvider;
use super::user_agent::parse_user_agent;
use crate::errors::Result;
use crate::storage::{AccessRecord, DailyVisitCount, SeaOrmStorage, VisitType};

/// 一次访问的原始信息（在请求线程中提取，后台处理）
#[derive(Debug, Clone)]
pub struct VisitContext {
    pub code: String,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub visit_type: VisitType,
}

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
    geoip: GeoIpProvider,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>, geoip: GeoIpProvider) -> Self {
        Self { storage, geoip }
    }

    /// 由原始访问信息构造访问记录
    pub async fn build_record(&self, visit: VisitContext) -> AccessRecord {
        let device = parse_user_agent(visit.user_agent.as_deref().unwrap_or_default());
        let location = self.geoip.locate(visit.ip_address.as_deref()).await;

        AccessRecord {
            short_url: visit.code,
            session_id: visit.session_id.filter(|s| !s.is_empty()),
            ip_address: visit.ip_address,
            user_agent: visit.user_agent,
            referrer: visit.referrer.filter(|r| !r.is_empty()),
            accessed_at: Utc::now(),
            visit_type: visit.visit_type,
            city: location.city,
            country: location.country,
            browser: device.browser_label(),
            device: device.device,
            operating_system: device.operating_system,
        }
    }

    /// 同步记录一次访问
    pub async fn record(&self, visit: VisitContext) -> Result<()> {
        let record = self.build_record(visit).await;
        self.storage.record_access(&record).await
    }

    /// 后台记录，不阻塞响应
    pub fn spawn_record(self: &Arc<Self>, visit: VisitContext) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let code = visit.code.clone();
            match service.record(visit).await {
                Ok(()) => debug!("Analytics recorded for {}", code),
                Err(e) => error!("Failed to record analytics for {}: {}", code, e),
            }
        });
    }

    /// 按天统计访问量
    pub async fn daily_visits(&self) -> Result<Vec<DailyVisitCount>> {
        self.storage.daily_visit_counts().await
    }
}
