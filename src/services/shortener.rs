//! 短码生成与冲突处理
//!
//! 短码 = xxh64(URL + 盐) 的 base62 编码，取前 8 位。
//! 同一 URL 对同一会话总是得到同一个短码；冲突时换盐重试。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use xxhash_rust::xxh64::xxh64;

use crate::errors::{Result, UseThisLinkError};
use crate::storage::{SeaOrmStorage, ShortLink};

const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const MIN_CODE_LEN: usize = 4;
const MAX_CODE_LEN: usize = 8;
/// 盐 0..5
const MAX_ATTEMPTS: u32 = 5;

/// base62 编码，高位在前，不足 4 位左侧补 '0'
pub fn base62(mut num: u64) -> String {
    let mut digits = Vec::with_capacity(11);
    while num > 0 {
        digits.push(BASE62_ALPHABET[(num % 62) as usize]);
        num /= 62;
    }
    while digits.len() < MIN_CODE_LEN {
        digits.push(BASE62_ALPHABET[0]);
    }
    digits.reverse();
    // 字母表全是 ASCII
    digits.into_iter().map(char::from).collect()
}

/// 由输入生成短码（确定性）
pub fn generate_short_code(input: &str) -> String {
    let mut code = base62(xxh64(input.as_bytes(), 0));
    code.truncate(MAX_CODE_LEN);
    code
}

/// 短码是否可能由本服务生成
#[inline]
pub fn is_valid_short_code(code: &str) -> bool {
    (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub struct ShortenerService {
    storage: Arc<SeaOrmStorage>,
    base_url: String,
}

impl ShortenerService {
    pub fn new(storage: Arc<SeaOrmStorage>, base_url: impl Into<String>) -> Self {
        Self {
            storage,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 拼出完整短链接
    pub fn full_short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    /// 保存 URL 并返回完整短链接
    ///
    /// 同一会话、同一用户再次提交同一 URL 时直接返回已有短链接。
    pub async fn store_url(
        &self,
        session_id: &str,
        user_email: Option<&str>,
        original_url: &str,
    ) -> Result<String> {
        if self.base_url.is_empty() {
            return Err(UseThisLinkError::internal("base URL is not configured"));
        }

        let user_email = user_email.filter(|e| !e.is_empty());

        for salt in 0..MAX_ATTEMPTS {
            let code = generate_short_code(&format!("{}{}", original_url, salt));
            let link = ShortLink {
                code: code.clone(),
                original_url: original_url.to_string(),
                session_id: session_id.to_string(),
                user_email: user_email.map(String::from),
                visits: 0,
                created_at: Utc::now(),
                expiry_date: None,
                is_logged_in: user_email.is_some(),
            };

            if self.storage.insert_link_if_absent(&link).await? {
                debug!("Stored {} -> {}", code, original_url);
                return Ok(self.full_short_url(&code));
            }

            match self.storage.get_link(&code).await? {
                Some(existing) if is_same_owner(&existing, session_id, user_email, original_url) => {
                    debug!("Reusing existing short code {} for {}", code, original_url);
                    return Ok(self.full_short_url(&code));
                }
                _ => debug!("Short code collision on {} (salt {})", code, salt),
            }
        }

        warn!(
            "Exhausted {} attempts generating a short code for {}",
            MAX_ATTEMPTS, original_url
        );
        Err(UseThisLinkError::short_code_exhausted(format!(
            "no free short code for {} after {} attempts",
            original_url, MAX_ATTEMPTS
        )))
    }
}

fn is_same_owner(
    existing: &ShortLink,
    session_id: &str,
    user_email: Option<&str>,
    original_url: &str,
) -> bool {
    existing.original_url == original_url
        && existing.session_id == session_id
        && existing.user_email.as_deref().filter(|e| !e.is_empty()) == user_email
}
