//! IP 地址处理工具
//!
//! - 客户端 IP 提取（可信代理、CIDR 匹配、私有地址自动检测）
//! - 保留地址段识别（用于跳过 GeoIP 查询）

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::dev::ConnectionInfo;
use tracing::debug;

/// IPv4 保留 / 特殊用途地址段及其作用域
const RESERVED_V4: &[(&str, &str)] = &[
    ("0.0.0.0/8", "Software"),
    ("10.0.0.0/8", "Private network"),
    ("100.64.0.0/10", "Private network"),
    ("127.0.0.0/8", "Host"),
    ("169.254.0.0/16", "Subnet"),
    ("172.16.0.0/12", "Private network"),
    ("192.0.0.0/24", "Private network"),
    ("192.0.2.0/24", "Documentation"),
    ("192.88.99.0/24", "Internet"),
    ("192.168.0.0/16", "Private network"),
    ("198.18.0.0/15", "Private network"),
    ("198.51.100.0/24", "Documentation"),
    ("203.0.113.0/24", "Documentation"),
    ("224.0.0.0/4", "Internet"),
    ("233.252.0.0/24", "Documentation"),
    ("240.0.0.0/4", "Internet"),
    ("255.255.255.255/32", "Subnet"),
];

/// IPv6 保留 / 特殊用途地址段及其作用域
const RESERVED_V6: &[(&str, &str)] = &[
    ("::1/128", "Host"),
    ("::/128", "Software"),
    ("::ffff:0:0/96", "Software"),
    ("::ffff:0:0:0/96", "Software"),
    ("64:ff9b::/96", "The global Internet"),
    ("64:ff9b:1::/48", "Private internets"),
    ("100::/64", "Routing"),
    ("2001::/32", "The global Internet"),
    ("2001:20::/28", "Software"),
    ("2001:db8::/32", "Documentation"),
    ("2002::/16", "The global Internet"),
    ("3fff::/20", "Documentation"),
    ("5f00::/16", "Routing"),
    ("fc00::/7", "Private internets"),
    ("fe80::/10", "Link"),
    ("ff00::/8", "The global Internet"),
];

/// 保留地址的作用域，公网地址返回 None
///
/// IPv4-mapped IPv6 地址（::ffff:a.b.c.d）按 IPv4 处理。
pub fn reserved_scope(ip: &IpAddr) -> Option<&'static str> {
    let ip = ip.to_canonical();
    let table = match ip {
        IpAddr::V4(_) => RESERVED_V4,
        IpAddr::V6(_) => RESERVED_V6,
    };
    table
        .iter()
        .find(|(cidr, _)| ip_in_cidr(&ip, cidr))
        .map(|(_, scope)| *scope)
}

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            // IPv6 私有地址：
            // - fc00::/7 (ULA, RFC 4193): fc00::/8 + fd00::/8
            // - fe80::/10 (Link-local)
            // - ::1 (Loopback)
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7 (包含 fc00 和 fd00)
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10 (link-local)
        }
    }
}

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    // 先尝试解析为 SocketAddr（支持 ip:port），如果失败再尝试纯 IpAddr
    let ip_addr = if let Ok(socket_addr) = ip.parse::<SocketAddr>() {
        socket_addr.ip()
    } else if let Ok(ip_addr) = ip.parse::<IpAddr>() {
        ip_addr
    } else {
        return false;
    };

    for proxy in trusted_proxies {
        if proxy.contains('/') {
            // CIDR 格式（如 "192.168.1.0/24"）
            if ip_in_cidr(&ip_addr, proxy) {
                return true;
            }
        } else {
            // 单 IP
            if let Ok(proxy_addr) = proxy.parse::<IpAddr>()
                && ip_addr == proxy_addr
            {
                return true;
            }
        }
    }
    false
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false, // IPv4 vs IPv6 不匹配
    }
}

/// 从 ConnectionInfo 提取真实客户端 IP（核心逻辑）
///
/// 策略（按优先级）：
/// 1. 无法获得对端地址 → 只能使用转发头
/// 2. 显式配置 trusted_proxies 且匹配 → 使用 X-Forwarded-For / X-Real-IP
/// 3. 未配置 trusted_proxies 且连接来自私有 IP → 视为反向代理，使用转发头
/// 4. 默认 → 使用连接 IP（公网直连场景，防止伪造）
pub fn extract_client_ip_from_conn_info<F>(
    conn_info: &ConnectionInfo,
    trusted_proxies: &[String],
    get_forwarded_ip: F,
) -> Option<String>
where
    F: FnOnce() -> Option<String>,
{
    let Some(peer_ip) = conn_info.peer_addr() else {
        return get_forwarded_ip();
    };

    if !trusted_proxies.is_empty() {
        if is_trusted_proxy(peer_ip, trusted_proxies) {
            let real_ip = get_forwarded_ip().unwrap_or_else(|| peer_ip.to_string());
            debug!("Trusted proxy (explicit): {} -> {}", peer_ip, real_ip);
            return Some(real_ip);
        }
        debug!(
            "Connection from {}, not in trusted_proxies, using peer IP",
            peer_ip
        );
        return Some(peer_ip.to_string());
    }

    if let Ok(ip_addr) = peer_ip.parse::<IpAddr>()
        && is_private_or_local(&ip_addr)
        && let Some(real_ip) = get_forwarded_ip()
    {
        debug!(
            "Auto-detect proxy (private IP {}): using forwarded IP {}",
            peer_ip, real_ip
        );
        return Some(real_ip);
    }

    Some(peer_ip.to_string())
}

/// 从 HttpRequest 提取真实客户端 IP
pub fn extract_client_ip(req: &HttpRequest, trusted_proxies: &[String]) -> Option<String> {
    extract_client_ip_from_conn_info(&req.connection_info(), trusted_proxies, || {
        extract_forwarded_ip_from_headers(req.headers())
    })
}

/// 从请求头提取转发的 IP（X-Forwarded-For 第一个条目，其次 X-Real-IP）
pub fn extract_forwarded_ip_from_headers(
    headers: &actix_web::http::header::HeaderMap,
) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}
