//! OTP 邮件发送
//!
//! 配置了 SMTP host 时走 lettre STARTTLS relay，否则只写日志（本地开发用）。

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::SmtpConfig;
use crate::errors::{Result, UseThisLinkError};

pub const OTP_SUBJECT: &str = "Your OTP for UseThisLink Registration";

/// 邮件正文
pub fn otp_body(otp: &str, ttl_minutes: i64) -> String {
    format!(
        "Your OTP for UseThisLink registration is: {}\nThis OTP is valid for {} minutes.",
        otp, ttl_minutes
    )
}

#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, to: &str, otp: &str, ttl_minutes: i64) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// SMTP 实现
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, host: &str) -> Result<Self> {
        let from_addr = if config.from.trim().is_empty() {
            config.user.clone().unwrap_or_default()
        } else {
            config.from.clone()
        };
        let from: Mailbox = from_addr
            .parse()
            .map_err(|e| UseThisLinkError::mail(format!("invalid sender '{}': {}", from_addr, e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| UseThisLinkError::mail(format!("invalid SMTP relay '{}': {}", host, e)))?
            .port(config.port);

        if let Some(user) = config.user.as_deref().filter(|u| !u.is_empty()) {
            builder = builder.credentials(Credentials::new(
                user.to_string(),
                config.password.clone().unwrap_or_default(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl OtpMailer for SmtpMailer {
    async fn send_otp(&self, to: &str, otp: &str, ttl_minutes: i64) -> Result<()> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| UseThisLinkError::mail(format!("invalid recipient '{}': {}", to, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(OTP_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(otp_body(otp, ttl_minutes))
            .map_err(|e| UseThisLinkError::mail(format!("failed to build OTP email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| UseThisLinkError::mail(format!("failed to send OTP email to {}: {}", to, e)))?;

        info!("OTP email sent to {}", to);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SMTP"
    }
}

/// 只记录日志的实现
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp(&self, to: &str, otp: &str, ttl_minutes: i64) -> Result<()> {
        warn!(
            "SMTP not configured, OTP for {} is {} (valid {} min)",
            to, otp, ttl_minutes
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Log"
    }
}

/// 根据配置选择实现
pub fn build_mailer(config: &SmtpConfig) -> Result<Arc<dyn OtpMailer>> {
    let mailer: Arc<dyn OtpMailer> = match config.host.as_deref().map(str::trim) {
        Some(host) if !host.is_empty() => Arc::new(SmtpMailer::new(config, host)?),
        _ => Arc::new(LogMailer),
    };
    info!("OTP mailer: {}", mailer.name());
    Ok(mailer)
}
