//! HTTP 层共享状态
//!
//! 服务在启动时构建一次，以 `web::Data<Arc<_>>` 的形式注册到每个 worker。

use std::sync::Arc;

use actix_web::web;

use crate::config::StaticConfig;
use crate::services::{
    AnalyticsService, AuthService, GeoIpProvider, LinkService, OtpMailer, ShortenerService,
};
use crate::storage::SeaOrmStorage;

/// 与请求处理相关的配置快照
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub cookie_name: String,
    pub anonymous_max_age_secs: i64,
    pub login_max_age_secs: i64,
    pub secure_cookie: bool,
    pub trusted_proxies: Vec<String>,
    /// 为空时禁用管理接口
    pub admin_token: String,
}

impl ApiSettings {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            cookie_name: config.session.cookie_name.clone(),
            anonymous_max_age_secs: config.session.anonymous_max_age_secs,
            login_max_age_secs: config.session.login_max_age_secs,
            secure_cookie: config.session.secure_cookie,
            trusted_proxies: config.server.trusted_proxies.clone(),
            admin_token: config.admin.token.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<SeaOrmStorage>,
    pub link_service: Arc<LinkService>,
    pub auth_service: Arc<AuthService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub settings: Arc<ApiSettings>,
}

impl AppState {
    /// 由存储和配置组装全部服务
    pub fn build(
        storage: Arc<SeaOrmStorage>,
        config: &StaticConfig,
        mailer: Arc<dyn OtpMailer>,
        geoip: GeoIpProvider,
    ) -> Self {
        let shortener = Arc::new(ShortenerService::new(
            storage.clone(),
            config.site.base_url.clone(),
        ));

        Self {
            link_service: Arc::new(LinkService::new(storage.clone(), shortener)),
            auth_service: Arc::new(AuthService::new(storage.clone(), mailer, &config.auth)),
            analytics_service: Arc::new(AnalyticsService::new(storage.clone(), geoip)),
            settings: Arc::new(ApiSettings::from_config(config)),
            storage,
        }
    }

    /// 注册 app_data
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.storage.clone()))
            .app_data(web::Data::new(self.link_service.clone()))
            .app_data(web::Data::new(self.auth_service.clone()))
            .app_data(web::Data::new(self.analytics_service.clone()))
            .app_data(web::Data::new(self.settings.clone()));
    }
}
