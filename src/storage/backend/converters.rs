//! Entity Model 与领域模型之间的转换

use std::collections::BTreeMap;

use tracing::warn;

use crate::storage::models::{
    LinkAnalyticsSummary, PendingRegistration, ShortLink, UserAccount,
};
use migration::entities::{link_analytics, pending_registration, url_mapping, user};

pub fn model_to_shortlink(model: url_mapping::Model) -> ShortLink {
    ShortLink {
        code: model.short_url,
        original_url: model.original_url,
        session_id: model.session_id,
        user_email: model.user_email,
        visits: model.visits.max(0),
        created_at: model.created_at,
        expiry_date: model.expiry_date,
        is_logged_in: model.is_logged_in,
    }
}

pub fn shortlink_to_active_model(link: &ShortLink) -> url_mapping::ActiveModel {
    use sea_orm::ActiveValue::Set;

    url_mapping::ActiveModel {
        short_url: Set(link.code.clone()),
        original_url: Set(link.original_url.clone()),
        session_id: Set(link.session_id.clone()),
        user_email: Set(link.user_email.clone()),
        visits: Set(link.visits),
        created_at: Set(link.created_at),
        expiry_date: Set(link.expiry_date),
        is_logged_in: Set(link.is_logged_in),
    }
}

pub fn model_to_user(model: user::Model) -> UserAccount {
    UserAccount {
        email: model.email_id,
        unique_id: model.unique_id,
        password_hash: model.user_pswd,
        locked: model.acct_lock != 0,
        signed_in: model.is_signed_in != 0,
        failed_logins: model.failed_logins,
        last_sign_on: model.last_sign_on_dttm,
        last_sign_off: model.last_sign_off_dttm,
    }
}

pub fn model_to_pending(model: pending_registration::Model) -> PendingRegistration {
    PendingRegistration {
        email: model.email_id,
        otp: model.otp,
        otp_expires_at: model.otp_expires_at,
        password_hash: model.user_pswd,
        unique_id: model.unique_id,
        created_at: model.created_at,
    }
}

pub fn model_to_analytics(model: link_analytics::Model) -> LinkAnalyticsSummary {
    LinkAnalyticsSummary {
        total_visits: model.total_visits,
        unique_visitors: model.unique_visitors,
        redirect_count: model.redirect_count,
        preview_count: model.preview_count,
        country_counts: parse_counts(model.country_counts.as_deref()),
        browser_counts: parse_counts(model.browser_counts.as_deref()),
        device_counts: parse_counts(model.device_counts.as_deref()),
        last_updated: Some(model.last_updated),
    }
}

/// 解析 `{"name": count}` 形式的计数 JSON，损坏的数据按空处理
pub fn parse_counts(raw: Option<&str>) -> BTreeMap<String, i64> {
    match raw.map(str::trim) {
        None | Some("") => BTreeMap::new(),
        Some(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            warn!("Discarding malformed counter JSON '{}': {}", text, e);
            BTreeMap::new()
        }),
    }
}

/// 对计数 JSON 中的某个键加一，返回新的 JSON 文本
pub fn increment_count(raw: Option<&str>, key: &str) -> String {
    let mut counts = parse_counts(raw);
    *counts.entry(key.to_string()).or_insert(0) += 1;
    serde_json::to_string(&counts).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_increment_count_adds_new_key() {
        assert_eq!(increment_count(None, "US"), r#"{"US":1}"#);
    }

    #[test]
    fn test_increment_count_keeps_other_keys() {
        let updated = increment_count(Some(r#"{"US":10,"IN":5}"#), "IN");
        let parsed = parse_counts(Some(&updated));
        assert_eq!(parsed.get("US"), Some(&10));
        assert_eq!(parsed.get("IN"), Some(&6));
    }

    #[test]
    fn test_parse_counts_tolerates_garbage() {
        assert!(parse_counts(Some("not json")).is_empty());
        assert!(parse_counts(Some("  ")).is_empty());
    }

    #[test]
    fn test_model_to_user_flags() {
        let model = user::Model {
            email_id: "a@b.com".into(),
            unique_id: "uid".into(),
            full_name_desc: String::new(),
            user_pswd: "hash".into(),
            language_code: "ENG".into(),
            currency_code: "INR".into(),
            last_pswd_change: None,
            acct_lock: 1,
            is_signed_in: 0,
            default_home: String::new(),
            failed_logins: 5,
            created_dttm: Some(Utc::now()),
            last_sign_on_dttm: None,
            last_sign_off_dttm: None,
            last_upd_dttm: None,
        };
        let account = model_to_user(model);
        assert!(account.locked);
        assert!(!account.signed_in);
        assert_eq!(account.failed_logins, 5);
    }
}
