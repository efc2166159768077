//! Shared test harness: temp SQLite database, fixed GeoIP and a mailer that
//! keeps every OTP it was asked to send.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error};
use async_trait::async_trait;
use tempfile::TempDir;

use usethislink::api::middleware::SessionMiddleware;
use usethislink::api::{AppState, configure_app};
use usethislink::config::StaticConfig;
use usethislink::errors::Result;
use usethislink::services::{GeoInfo, GeoIpLookup, GeoIpProvider, OtpMailer};
use usethislink::storage::SeaOrmStorage;
use usethislink::storage::backend::retry::RetryConfig;
use usethislink::storage::backend::{connect_sqlite, run_migrations};

pub const BASE_URL: &str = "http://short.test";
pub const COOKIE_NAME: &str = "UTL_SESSION";
pub const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const GOOGLEBOT_UA: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// 记录所有发出的 OTP
#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingMailer {
    pub fn last_otp_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, otp)| otp.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl OtpMailer for CapturingMailer {
    async fn send_otp(&self, to: &str, otp: &str, _ttl_minutes: i64) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), otp.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "capture"
    }
}

/// 所有公网地址都解析到 Berlin, Germany
pub struct FixedGeo;

#[async_trait]
impl GeoIpLookup for FixedGeo {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        Some(GeoInfo {
            country: Some("Germany".to_string()),
            city: Some("Berlin".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

pub struct TestEnv {
    // 保持临时目录存活
    _dir: TempDir,
    pub storage: Arc<SeaOrmStorage>,
    pub mailer: Arc<CapturingMailer>,
    pub state: AppState,
}

pub fn test_config() -> StaticConfig {
    let mut config = StaticConfig::default();
    config.site.base_url = BASE_URL.to_string();
    config.session.cookie_name = COOKIE_NAME.to_string();
    config.admin.token = "admin-secret".to_string();
    config
}

pub async fn setup() -> TestEnv {
    setup_with(test_config()).await
}

pub async fn setup_with(config: StaticConfig) -> TestEnv {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let db = connect_sqlite(&db_url)
        .await
        .expect("Failed to connect to SQLite");
    run_migrations(&db).await.expect("Failed to run migrations");

    let storage = Arc::new(SeaOrmStorage::from_connection(
        db,
        "sqlite",
        RetryConfig::default(),
    ));
    let mailer = Arc::new(CapturingMailer::default());
    let state = AppState::build(
        storage.clone(),
        &config,
        mailer.clone() as Arc<dyn OtpMailer>,
        GeoIpProvider::with_lookup(Arc::new(FixedGeo)),
    );

    TestEnv {
        _dir: dir,
        storage,
        mailer,
        state,
    }
}

/// 与生产环境相同的路由和会话中间件
pub fn app(
    state: &AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = Error,
        InitError = (),
    > + use<>,
> {
    let state = state.clone();
    App::new()
        .wrap(SessionMiddleware::new(state.settings.clone()))
        .configure(move |cfg| configure_app(cfg, &state))
}

/// 从响应中取出会话 Cookie 的值
pub fn session_cookie_value<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE_NAME)
        .map(|c| c.value().to_string())
}

pub fn session_cookie(id: &str) -> Cookie<'static> {
    Cookie::new(COOKIE_NAME, id.to_string())
}

/// 完整短链接的最后一段
pub fn code_of(short_url: &str) -> String {
    short_url
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// 等待后台分析任务写入
pub async fn wait_for_access_logs(storage: &SeaOrmStorage, code: &str, expected: u64) {
    for _ in 0..100 {
        if storage.count_access_logs(code).await.unwrap_or(0) >= expected {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("analytics for {} never reached {} rows", code, expected);
}
