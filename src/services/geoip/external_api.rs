//! 外部 GeoIP API 实现
//!
//! 默认使用 ipapi.co（`{"city": "...", "country_name": "..."}`），
//! 也兼容 ip-api.com 等常见字段名。内置缓存，同一 IP 的并发查询只发一次请求。

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{trace, warn};
use ureq::Agent;

use super::provider::{GeoInfo, GeoIpLookup};

/// GeoIP 缓存 TTL（15 分钟）
const GEOIP_CACHE_TTL_SECS: u64 = 15 * 60;
/// GeoIP 缓存最大容量
const GEOIP_CACHE_MAX_CAPACITY: u64 = 10_000;
/// HTTP 请求超时时间
const HTTP_TIMEOUT_SECS: u64 = 3;

static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .user_agent("usethislink-geoip/0.1")
            .build()
            .into()
    })
}

/// 解析 GeoIP API 的 JSON 响应
///
/// 失败标记：`{"error": true}`（ipapi.co）或 `{"status": "fail"}`（ip-api.com）
pub fn parse_geo_response(json: &serde_json::Value) -> Option<GeoInfo> {
    if json["error"].as_bool() == Some(true) || json["status"].as_str() == Some("fail") {
        return None;
    }

    let country = ["country_name", "country", "countryCode", "country_code"]
        .iter()
        .find_map(|key| json[*key].as_str())
        .filter(|s| !s.is_empty())
        .map(String::from);

    let city = json["city"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from);

    if country.is_none() && city.is_none() {
        return None;
    }
    Some(GeoInfo { country, city })
}

/// 外部 API GeoIP Provider
pub struct ExternalApiProvider {
    api_url_template: String,
    /// IP → GeoInfo 缓存（None 也缓存，避免反复查询失败的地址）
    cache: Cache<String, Option<GeoInfo>>,
}

impl ExternalApiProvider {
    /// `api_url_template` 使用 `{ip}` 作为占位符
    pub fn new(api_url_template: &str) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(GEOIP_CACHE_TTL_SECS))
            .max_capacity(GEOIP_CACHE_MAX_CAPACITY)
            .build();

        Self {
            api_url_template: api_url_template.to_string(),
            cache,
        }
    }

    /// 同步请求，在 spawn_blocking 中调用
    fn fetch_sync(url: String) -> Option<GeoInfo> {
        let resp = match get_agent().get(&url).call() {
            Ok(r) => r,
            Err(e) => {
                warn!("GeoIP API request to \"{}\" failed: {}", url, e);
                return None;
            }
        };

        let json: serde_json::Value = match resp.into_body().read_json() {
            Ok(j) => j,
            Err(e) => {
                warn!("GeoIP API response from \"{}\" parse failed: {}", url, e);
                return None;
            }
        };

        let info = parse_geo_response(&json);
        trace!("External API lookup {}: {:?}", url, info);
        info
    }

    async fn fetch(&self, ip: &str) -> Option<GeoInfo> {
        let url = self.api_url_template.replace("{ip}", ip);

        tokio::task::spawn_blocking(move || Self::fetch_sync(url))
            .await
            .unwrap_or_else(|e| {
                warn!("GeoIP spawn_blocking failed: {}", e);
                None
            })
    }
}

#[async_trait]
impl GeoIpLookup for ExternalApiProvider {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        // get_with: 同一 key 的并发调用只执行一次
        self.cache
            .get_with(ip.to_string(), async {
                trace!("GeoIP cache miss for {}, fetching from API", ip);
                self.fetch(ip).await
            })
            .await
    }

    fn name(&self) -> &'static str {
        "ExternalAPI"
    }
}
