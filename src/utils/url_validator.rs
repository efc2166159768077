//! URL 验证模块
//!
//! 规范化用户提交的长链接，阻止危险协议、残缺域名和指向本服务的链接

use url::Url;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    DangerousProtocol(String),
    IncompleteDomain,
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::DangerousProtocol(proto) => {
                write!(f, "Dangerous protocol blocked: {}", proto)
            }
            Self::IncompleteDomain => write!(f, "Invalid or incomplete domain"),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// 规范化并验证待缩短的 URL
///
/// 1. 去掉首尾空白，空串拒绝
/// 2. 危险协议（javascript:, data:, file: 等）拒绝
/// 3. 没有 `://` 时补 `http://`
/// 4. 必须能解析，且主机名包含 `.`
/// 5. 只允许 http / https
pub fn normalize_url(raw: &str) -> Result<Url, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let lower = raw.to_lowercase();
    if let Some(proto) = DANGEROUS_PROTOCOLS.iter().find(|p| lower.starts_with(*p)) {
        return Err(UrlValidationError::DangerousProtocol(proto.to_string()));
    }

    let candidate = with_default_scheme(raw);

    let parsed = Url::parse(&candidate).map_err(|_| UrlValidationError::IncompleteDomain)?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidProtocol(format!("{}:", other))),
    }

    match parsed.host_str() {
        Some(host) if host.contains('.') => Ok(parsed),
        _ => Err(UrlValidationError::IncompleteDomain),
    }
}

/// 没有 `://` 时补 `http://`，保存链接时使用该形式
pub fn with_default_scheme(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

/// 判断链接是否指向本服务
///
/// 原始输入包含 base URL，或主机名（含端口）包含 base URL 的主机名时视为自引用。
pub fn points_to_service(raw: &str, parsed: &Url, base_url: &str) -> bool {
    let base_url = base_url.trim().trim_end_matches('/');
    if base_url.is_empty() {
        return false;
    }

    if raw.to_lowercase().contains(&base_url.to_lowercase()) {
        return true;
    }

    let base_host = base_authority(base_url);
    if base_host.is_empty() {
        return false;
    }

    let Some(host) = parsed.host_str() else {
        return false;
    };
    let authority = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    authority.to_lowercase().contains(&base_host)
}

/// base URL 去掉协议和路径后的 host[:port]
fn base_authority(base_url: &str) -> String {
    let without_scheme = base_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(base_url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_missing_scheme() {
        let url = normalize_url("example.com/path").unwrap();
        assert_eq!(url.as_str(), "http://example.com/path");
    }

    #[test]
    fn test_keeps_https() {
        let url = normalize_url("  https://www.rust-lang.org/learn ").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("www.rust-lang.org"));
    }

    #[test]
    fn test_rejects_dotless_host() {
        assert_eq!(
            normalize_url("localhost:8080/x"),
            Err(UrlValidationError::IncompleteDomain)
        );
        assert_eq!(
            normalize_url("http://intranet"),
            Err(UrlValidationError::IncompleteDomain)
        );
    }

    #[test]
    fn test_rejects_dangerous_protocols() {
        assert!(matches!(
            normalize_url("javascript:alert(1)"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
        assert!(matches!(
            normalize_url("DATA:text/html,<b>x</b>"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        assert!(matches!(
            normalize_url("ftp://files.example.com"),
            Err(UrlValidationError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize_url("   "), Err(UrlValidationError::EmptyUrl));
    }

    #[test]
    fn test_points_to_service() {
        let base = "https://utl.ink";
        let raw = "https://utl.ink/abcd";
        assert!(points_to_service(raw, &normalize_url(raw).unwrap(), base));

        let raw = "http://utl.ink/abcd";
        assert!(points_to_service(raw, &normalize_url(raw).unwrap(), base));

        let raw = "https://example.com/?next=utl";
        assert!(!points_to_service(raw, &normalize_url(raw).unwrap(), base));
    }

    #[test]
    fn test_points_to_service_with_port() {
        let base = "http://short.example.com:8080/";
        let raw = "short.example.com:8080/x";
        assert!(points_to_service(raw, &normalize_url(raw).unwrap(), base));

        let raw = "short.example.com/x";
        assert!(!points_to_service(raw, &normalize_url(raw).unwrap(), base));
    }
}
