use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 优先级：旧版扁平环境变量 > UTL__ 环境变量 > config.toml > 默认值
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// ENV 前缀：UTL，分隔符：__
    /// 示例：UTL__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("UTL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        };

        config.apply_legacy_env(|key| std::env::var(key).ok());
        config
    }

    /// 兼容旧部署使用的扁平环境变量
    ///
    /// BASE_URL, PORT, DB_PATH, SMTP_HOST, SMTP_PORT, SMTP_USER, SMTP_PASS
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = non_empty("BASE_URL") {
            self.site.base_url = base_url;
        }
        if let Some(port) = non_empty("PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => eprintln!("[WARN] Ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(db_path) = non_empty("DB_PATH") {
            self.database.database_url = db_path;
        }
        if let Some(host) = non_empty("SMTP_HOST") {
            self.smtp.host = Some(host);
        }
        if let Some(port) = non_empty("SMTP_PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => self.smtp.port = p,
                Err(_) => eprintln!("[WARN] Ignoring invalid SMTP_PORT value: {}", port),
            }
        }
        if let Some(user) = non_empty("SMTP_USER") {
            self.smtp.user = Some(user);
        }
        if let Some(pass) = non_empty("SMTP_PASS") {
            self.smtp.password = Some(pass);
        }
    }

    /// 启动前校验
    pub fn validate(&self) -> Result<(), String> {
        if self.site.base_url.trim().is_empty() {
            return Err("site.base_url (BASE_URL) must be set".to_string());
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(format!(
                "Invalid logging.format '{}'. Valid: text, json",
                self.logging.format
            ));
        }
        if self.auth.max_failed_logins == 0 {
            return Err("auth.max_failed_logins must be greater than 0".to_string());
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.site.base_url = "http://localhost:8080".to_string();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 允许携带 X-Forwarded-For / X-Real-IP 的代理（IP 或 CIDR）
    /// 为空时只信任私有 / 回环地址的对端
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
    /// CORS 允许的来源，为空时不启用 CORS
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// 站点配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiteConfig {
    /// 生成短链接时使用的前缀，例如 https://utl.ink
    #[serde(default)]
    pub base_url: String,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 会话 Cookie 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// 匿名会话 Cookie 有效期（秒）
    #[serde(default = "default_anonymous_max_age")]
    pub anonymous_max_age_secs: i64,
    /// 登录后重新签发的 Cookie 有效期（秒）
    #[serde(default = "default_login_max_age")]
    pub login_max_age_secs: i64,
    #[serde(default = "default_secure_cookie")]
    pub secure_cookie: bool,
}

/// 注册 / 登录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_secs: i64,
    #[serde(default = "default_max_failed_logins")]
    pub max_failed_logins: i32,
}

/// SMTP 配置，host 为空时只把 OTP 写入日志
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_smtp_from")]
    pub from: String,
}

/// 分析统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_enable_geo_lookup")]
    pub enable_geo_lookup: bool,

    /// MaxMindDB 文件路径 (GeoLite2-City.mmdb)
    /// 如果配置且文件可读，使用本地解析；否则 fallback 到外部 API
    #[serde(default)]
    pub maxminddb_path: Option<String>,

    /// 外部 GeoIP API URL (fallback)
    /// 使用 {ip} 作为占位符
    #[serde(default = "default_geoip_api_url")]
    pub geoip_api_url: String,
}

/// 管理接口配置，token 为空时禁用 /admin
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub token: String,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "usethislink.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_cookie_name() -> String {
    "UTL_SESSION".to_string()
}

fn default_anonymous_max_age() -> i64 {
    365 * 24 * 60 * 60
}

fn default_login_max_age() -> i64 {
    7 * 24 * 60 * 60
}

fn default_secure_cookie() -> bool {
    true
}

fn default_otp_ttl() -> i64 {
    600
}

fn default_max_failed_logins() -> i32 {
    5
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "noreply@usethislink.local".to_string()
}

fn default_enable_geo_lookup() -> bool {
    true
}

fn default_geoip_api_url() -> String {
    "https://ipapi.co/{ip}/json/".to_string()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            trusted_proxies: Vec::new(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            anonymous_max_age_secs: default_anonymous_max_age(),
            login_max_age_secs: default_login_max_age(),
            secure_cookie: default_secure_cookie(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: default_otp_ttl(),
            max_failed_logins: default_max_failed_logins(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_smtp_port(),
            user: None,
            password: None,
            from: default_smtp_from(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enable_geo_lookup: default_enable_geo_lookup(),
            maxminddb_path: None,
            geoip_api_url: default_geoip_api_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(map: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.session.cookie_name, "UTL_SESSION");
        assert_eq!(config.auth.otp_ttl_secs, 600);
        assert_eq!(config.auth.max_failed_logins, 5);
        assert_eq!(config.session.login_max_age_secs, 604_800);
        assert!(config.site.base_url.is_empty());
    }

    #[test]
    fn test_legacy_env_overrides() {
        let mut config = StaticConfig::default();
        config.apply_legacy_env(lookup_from(HashMap::from([
            ("BASE_URL", "https://utl.ink"),
            ("PORT", "9090"),
            ("DB_PATH", "sqlite://links.db?mode=rwc"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASS", "secret"),
        ])));

        assert_eq!(config.site.base_url, "https://utl.ink");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.database_url, "sqlite://links.db?mode=rwc");
        assert_eq!(config.smtp.host.as_deref(), Some("smtp.example.com"));
        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.smtp.user.as_deref(), Some("mailer"));
        assert_eq!(config.smtp.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_legacy_env_ignores_invalid_port() {
        let mut config = StaticConfig::default();
        config.apply_legacy_env(lookup_from(HashMap::from([("PORT", "not-a-port")])));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate_requires_base_url() {
        let mut config = StaticConfig::default();
        assert!(config.validate().is_err());
        config.site.base_url = "http://localhost:8080".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = StaticConfig::default();
        config.site.base_url = "http://localhost:8080".to_string();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.site.base_url, "http://localhost:8080");
        assert_eq!(parsed.session.cookie_name, "UTL_SESSION");
    }
}
