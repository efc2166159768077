use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 一条短链接映射
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortLink {
    pub code: String,
    pub original_url: String,
    pub session_id: String,
    pub user_email: Option<String>,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_logged_in: bool,
}

/// 访问类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum VisitType {
    Redirect,
    Preview,
}

/// 一次访问的完整记录（写入 url_access_logs 并累加到 link_analytics）
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub short_url: String,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub accessed_at: DateTime<Utc>,
    pub visit_type: VisitType,
    pub city: String,
    pub country: String,
    /// "{name} {version}"
    pub browser: String,
    pub device: String,
    pub operating_system: String,
}

/// link_analytics 行解析后的聚合数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkAnalyticsSummary {
    pub total_visits: i64,
    pub unique_visitors: i64,
    pub redirect_count: i64,
    pub preview_count: i64,
    pub country_counts: BTreeMap<String, i64>,
    pub browser_counts: BTreeMap<String, i64>,
    pub device_counts: BTreeMap<String, i64>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// 每日访问量
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyVisitCount {
    pub day: String,
    pub count: i64,
}

/// 用户账户
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub email: String,
    pub unique_id: String,
    pub password_hash: String,
    pub locked: bool,
    pub signed_in: bool,
    pub failed_logins: i32,
    pub last_sign_on: Option<DateTime<Utc>>,
    pub last_sign_off: Option<DateTime<Utc>>,
}

/// 等待 OTP 验证的注册
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub email: String,
    pub otp: String,
    pub otp_expires_at: DateTime<Utc>,
    pub password_hash: String,
    pub unique_id: String,
    pub created_at: DateTime<Utc>,
}

/// 登录失败后的账户状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedLoginOutcome {
    pub failed_logins: i32,
    pub locked: bool,
}
