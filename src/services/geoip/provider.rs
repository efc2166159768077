//! GeoIP Provider 抽象层
//!
//! 统一的 GeoIP 查询接口，根据配置自动选择实现：
//! 1. 地理查询关闭 → 不查询
//! 2. maxminddb_path 已配置且文件可读 → MaxMindProvider
//! 3. 否则 → ExternalApiProvider

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::external_api::ExternalApiProvider;
use super::maxmind::MaxMindProvider;
use crate::config::AnalyticsConfig;
use crate::utils::reserved_scope;

pub const UNKNOWN: &str = "Unknown";
const LOCALHOST_CITY: &str = "Localhost";

/// 单个 provider 返回的地理位置信息（字段可能缺失）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub city: Option<String>,
}

/// 最终写入访问日志的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Location {
    pub fn unknown() -> Self {
        Self {
            city: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
        }
    }
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询 IP 地址的地理位置
    async fn lookup(&self, ip: &str) -> Option<GeoInfo>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 关闭地理查询时使用
struct DisabledLookup;

#[async_trait]
impl GeoIpLookup for DisabledLookup {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "Disabled"
    }
}

/// 统一 GeoIP Provider
#[derive(Clone)]
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
}

impl GeoIpProvider {
    /// 根据 AnalyticsConfig 初始化
    pub fn new(config: &AnalyticsConfig) -> Self {
        let inner: Arc<dyn GeoIpLookup> = if !config.enable_geo_lookup {
            debug!("GeoIP: lookups disabled by configuration");
            Arc::new(DisabledLookup)
        } else if let Some(ref path) = config.maxminddb_path {
            match MaxMindProvider::new(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Arc::new(provider)
                }
                Err(e) => {
                    warn!(
                        "GeoIP: Failed to load MaxMind database at {}: {}, falling back to external API",
                        path, e
                    );
                    Arc::new(ExternalApiProvider::new(&config.geoip_api_url))
                }
            }
        } else {
            debug!("GeoIP: No MaxMind database configured, using external API");
            Arc::new(ExternalApiProvider::new(&config.geoip_api_url))
        };

        info!("GeoIP: Initialized with {} provider", inner.name());
        Self { inner }
    }

    /// 使用自定义实现（测试或嵌入场景）
    pub fn with_lookup(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self { inner }
    }

    /// 获取当前使用的 provider 名称
    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }

    /// 解析访问者位置
    ///
    /// - 无 IP 或无法解析 → Unknown/Unknown
    /// - 保留地址 → Localhost + 地址段作用域
    /// - 其余交给 provider，缺失字段补 Unknown
    pub async fn locate(&self, ip: Option<&str>) -> Location {
        let Some(ip) = ip.map(str::trim).filter(|ip| !ip.is_empty()) else {
            return Location::unknown();
        };

        let Ok(addr) = ip.parse::<IpAddr>() else {
            debug!("GeoIP: unparsable client address {:?}", ip);
            return Location::unknown();
        };

        if let Some(scope) = reserved_scope(&addr) {
            return Location {
                city: LOCALHOST_CITY.to_string(),
                country: scope.to_string(),
            };
        }

        match self.inner.lookup(&addr.to_canonical().to_string()).await {
            Some(info) => Location {
                city: non_empty_or_unknown(info.city),
                country: non_empty_or_unknown(info.country),
            },
            None => Location::unknown(),
        }
    }
}

fn non_empty_or_unknown(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
