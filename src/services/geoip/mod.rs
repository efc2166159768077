//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能，支持：
//! - 保留地址段直接判定（不查询）
//! - MaxMind GeoLite2 本地数据库
//! - 外部 HTTP API fallback (ipapi.co 兼容格式)

mod external_api;
mod maxmind;
mod provider;

pub use external_api::parse_geo_response;
pub use provider::{GeoInfo, GeoIpLookup, GeoIpProvider, Location};
