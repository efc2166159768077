//! Link service
//!
//! 缩短、重定向查询、统计与历史记录的业务逻辑，HTTP handler 只做参数提取。

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::shortener::{ShortenerService, is_valid_short_code};
use crate::errors::{Result, UseThisLinkError};
use crate::storage::{SeaOrmStorage, ShortLink};
use crate::utils::{UrlValidationError, normalize_url, points_to_service, with_default_scheme};

pub const MSG_INVALID_BODY: &str = "Invalid request body";
pub const MSG_SELF_REFERENCE: &str = "You cannot shorten URLs that point to this service.";
pub const MSG_LINK_NOT_FOUND: &str = "Short URL not found";

// ============ Response DTOs ============

/// `GET /stats/{code}` 响应
#[derive(Debug, Clone, Serialize)]
pub struct LinkStats {
    pub short_url: String,
    pub original_url: String,
    pub total_visits: i64,
    pub unique_visitors: i64,
    pub redirect_count: i64,
    pub preview_count: i64,
    pub created_at: DateTime<Utc>,
    pub country_stats: BTreeMap<String, i64>,
    pub browser_stats: BTreeMap<String, i64>,
    pub device_stats: BTreeMap<String, i64>,
}

/// `GET /api/history` 中的一项
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
    pub original_url: String,
    pub short_url: String,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_logged_in: bool,
    pub user_email: Option<String>,
}

/// 调用方信息，写入 sessions 表
#[derive(Debug, Clone, Default)]
pub struct ClientContext<'a> {
    pub user_agent: Option<&'a str>,
    pub ip_address: Option<&'a str>,
}

fn validation_message(err: &UrlValidationError) -> String {
    match err {
        UrlValidationError::EmptyUrl => MSG_INVALID_BODY.to_string(),
        other => other.to_string(),
    }
}

pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
    shortener: Arc<ShortenerService>,
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>, shortener: Arc<ShortenerService>) -> Self {
        Self { storage, shortener }
    }

    pub fn shortener(&self) -> &ShortenerService {
        &self.shortener
    }

    /// 缩短链接，返回完整短链接
    pub async fn shorten(
        &self,
        session_id: &str,
        original_url: Option<&str>,
        client: ClientContext<'_>,
    ) -> Result<String> {
        let raw = original_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| UseThisLinkError::validation(MSG_INVALID_BODY))?;

        let parsed =
            normalize_url(raw).map_err(|e| UseThisLinkError::validation(validation_message(&e)))?;
        let target = with_default_scheme(raw);

        if points_to_service(&target, &parsed, self.shortener.base_url()) {
            warn!("Attempt to shorten a URL pointing to this service: {}", target);
            return Err(UseThisLinkError::validation(MSG_SELF_REFERENCE));
        }

        // 会话行尽力写入，失败不影响缩短
        if let Err(e) = self
            .storage
            .ensure_session(session_id, client.user_agent, client.ip_address)
            .await
        {
            warn!("Failed to record session {}: {}", session_id, e);
        }

        let user_email = self.storage.get_session_email(session_id).await?;

        self.shortener
            .store_url(session_id, user_email.as_deref(), &target)
            .await
    }

    /// 查找短码对应的链接
    pub async fn resolve(&self, code: &str) -> Result<ShortLink> {
        if !is_valid_short_code(code) {
            debug!("Rejected malformed short code: {:?}", code);
            return Err(UseThisLinkError::not_found(MSG_LINK_NOT_FOUND));
        }

        self.storage
            .get_link(code)
            .await?
            .ok_or_else(|| UseThisLinkError::not_found(MSG_LINK_NOT_FOUND))
    }

    /// 非爬虫访问：visits + 1
    pub async fn record_visit(&self, code: &str) -> Result<()> {
        self.storage.increment_visits(code).await
    }

    pub async fn stats(&self, code: &str) -> Result<LinkStats> {
        let link = self.resolve(code).await?;
        let analytics = self
            .storage
            .get_link_analytics(code)
            .await?
            .unwrap_or_default();

        Ok(LinkStats {
            short_url: self.shortener.full_short_url(&link.code),
            original_url: link.original_url,
            total_visits: link.visits,
            unique_visitors: analytics.unique_visitors,
            redirect_count: analytics.redirect_count,
            preview_count: analytics.preview_count,
            created_at: link.created_at,
            country_stats: analytics.country_counts,
            browser_stats: analytics.browser_counts,
            device_stats: analytics.device_counts,
        })
    }

    /// 当前会话（及其登录用户）的历史记录，新的在前
    pub async fn history(&self, session_id: &str) -> Result<Vec<HistoryItem>> {
        let user_email = self.storage.get_session_email(session_id).await?;
        let links = self
            .storage
            .list_history(session_id, user_email.as_deref())
            .await?;

        Ok(links
            .into_iter()
            .map(|link| HistoryItem {
                short_url: self.shortener.full_short_url(&link.code),
                original_url: link.original_url,
                expiry_date: link.expiry_date,
                is_logged_in: link.is_logged_in,
                user_email: link.user_email.filter(|e| !e.is_empty()),
            })
            .collect())
    }
}
