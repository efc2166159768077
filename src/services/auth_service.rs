//! 账户注册、OTP 验证与登录
//!
//! 注册流程：register 生成 OTP 并写入 pending_registrations，
//! verify_otp 校验后创建 USERDEFN 行。登录成功时把会话绑定到邮箱，
//! 并把该会话里的匿名链接归到用户名下。

use std::sync::Arc;

use chrono::{Duration, Utc};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use super::mailer::OtpMailer;
use crate::config::AuthConfig;
use crate::errors::{Result, UseThisLinkError};
use crate::storage::{PendingRegistration, SeaOrmStorage};
use crate::utils::{hash_password, verify_password};

pub const MSG_ACCOUNT_EXISTS: &str =
    "An account with this email already exists. Please log in or use a different email.";
pub const MSG_INVALID_REQUEST: &str = "Invalid request";
pub const MSG_INVALID_EMAIL: &str = "Invalid email address";
pub const MSG_NO_PENDING: &str = "No pending registration";
pub const MSG_OTP_EXPIRED: &str = "OTP expired";
pub const MSG_INVALID_OTP: &str = "Invalid OTP";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const MSG_ACCOUNT_LOCKED: &str = "Account is locked";
pub const MSG_NO_SESSION: &str = "No session";

/// 6 位数字 OTP，保留前导 0
pub fn generate_otp() -> String {
    format!("{:06}", rand::random_range(0..1_000_000u32))
}

/// 常量时间比较
#[inline]
fn otp_matches(submitted: &str, stored: &str) -> bool {
    submitted.as_bytes().ct_eq(stored.as_bytes()).into()
}

fn require_credentials<'a>(email: &'a str, secret: &str) -> Result<&'a str> {
    let email = email.trim();
    if email.is_empty() || secret.is_empty() {
        return Err(UseThisLinkError::validation(MSG_INVALID_REQUEST));
    }
    Ok(email)
}

pub struct AuthService {
    storage: Arc<SeaOrmStorage>,
    mailer: Arc<dyn OtpMailer>,
    otp_ttl_secs: i64,
    max_failed_logins: i32,
}

impl AuthService {
    pub fn new(storage: Arc<SeaOrmStorage>, mailer: Arc<dyn OtpMailer>, config: &AuthConfig) -> Self {
        Self {
            storage,
            mailer,
            otp_ttl_secs: config.otp_ttl_secs,
            max_failed_logins: config.max_failed_logins.max(1),
        }
    }

    /// 开始注册：保存待验证记录并发送 OTP
    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        let email = require_credentials(email, password)?;
        // 与发信时相同的地址解析，发不出去的地址不落库
        if email.parse::<lettre::Address>().is_err() {
            return Err(UseThisLinkError::validation(MSG_INVALID_EMAIL));
        }

        if self.storage.get_user(email).await?.is_some() {
            debug!("Registration rejected, account exists: {}", email);
            return Err(UseThisLinkError::conflict(MSG_ACCOUNT_EXISTS));
        }

        let otp = generate_otp();
        let now = Utc::now();
        let pending = PendingRegistration {
            email: email.to_string(),
            otp: otp.clone(),
            otp_expires_at: now + Duration::seconds(self.otp_ttl_secs),
            password_hash: hash_password(password)?,
            unique_id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
        };
        self.storage.upsert_pending_registration(&pending).await?;

        let ttl_minutes = (self.otp_ttl_secs + 59) / 60;
        self.mailer.send_otp(email, &otp, ttl_minutes).await?;

        info!("Registration pending OTP verification: {}", email);
        Ok(())
    }

    /// 校验 OTP 并创建账户
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<()> {
        let email = require_credentials(email, otp)?;

        let pending = self
            .storage
            .get_pending_registration(email)
            .await?
            .ok_or_else(|| UseThisLinkError::not_found(MSG_NO_PENDING))?;

        if Utc::now() > pending.otp_expires_at {
            debug!("Expired OTP submitted for {}", email);
            return Err(UseThisLinkError::unauthorized(MSG_OTP_EXPIRED));
        }

        if !otp_matches(otp.trim(), &pending.otp) {
            debug!("Wrong OTP submitted for {}", email);
            return Err(UseThisLinkError::unauthorized(MSG_INVALID_OTP));
        }

        self.storage.complete_registration(&pending).await
    }

    /// 登录并把当前会话绑定到该账户
    pub async fn login(
        &self,
        session_id: &str,
        email: &str,
        password: &str,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<()> {
        let email = require_credentials(email, password)?;

        let account = self
            .storage
            .get_user(email)
            .await?
            .ok_or_else(|| UseThisLinkError::unauthorized(MSG_INVALID_CREDENTIALS))?;

        if account.locked {
            return Err(UseThisLinkError::forbidden(MSG_ACCOUNT_LOCKED));
        }

        if !verify_password(password, &account.password_hash)? {
            let outcome = self
                .storage
                .record_failed_login(email, self.max_failed_logins)
                .await?;
            debug!(
                "Failed login for {} ({} failures)",
                email, outcome.failed_logins
            );
            return Err(UseThisLinkError::unauthorized(MSG_INVALID_CREDENTIALS));
        }

        let now = Utc::now();
        self.storage.record_successful_login(email, now).await?;

        self.storage
            .ensure_session(session_id, user_agent, ip_address)
            .await?;
        self.storage.set_session_email(session_id, Some(email)).await?;

        // 链接迁移失败不影响登录
        if let Err(e) = self.storage.claim_session_links(session_id, email).await {
            warn!("Failed to migrate links of session {}: {}", session_id, e);
        }

        info!("User logged in: {}", email);
        Ok(())
    }

    /// 退出登录，返回之前绑定的邮箱
    pub async fn logout(&self, session_id: &str) -> Result<Option<String>> {
        if session_id.is_empty() {
            return Err(UseThisLinkError::unauthorized(MSG_NO_SESSION));
        }

        let email = self.storage.get_session_email(session_id).await?;
        if let Some(ref email) = email {
            self.storage.record_logout(email, Utc::now()).await?;
            info!("User logged out: {}", email);
        }
        self.storage.set_session_email(session_id, None).await?;

        Ok(email)
    }

    /// 当前会话登录的邮箱
    pub async fn session_email(&self, session_id: &str) -> Result<Option<String>> {
        Ok(self
            .storage
            .get_session_email(session_id)
            .await?
            .filter(|e| !e.is_empty()))
    }
}
