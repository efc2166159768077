//! Service layer for business logic
//!
//! HTTP handler 只负责提取参数，业务规则都在这里。

mod analytics_service;
mod auth_service;
pub mod geoip;
mod link_service;
pub mod mailer;
pub mod qrcode;
pub mod shortener;
pub mod user_agent;

pub use analytics_service::*;
pub use auth_service::*;
pub use geoip::{GeoInfo, GeoIpLookup, GeoIpProvider, Location};
pub use link_service::*;
pub use mailer::{LogMailer, OtpMailer, SmtpMailer, build_mailer};
pub use shortener::{ShortenerService, base62, generate_short_code, is_valid_short_code};
pub use user_agent::{DeviceInfo, parse_user_agent};
