//! Session middleware
//!
//! 每个浏览器由 UTL_SESSION Cookie 标识。没有 Cookie 时生成 UUID v4，
//! 并在响应中下发（除非 handler 已经设置了同名 Cookie，例如登录）。

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    cookie::{Cookie, SameSite, time::Duration as CookieDuration},
    dev::{Payload, ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{trace, warn};
use uuid::Uuid;

use crate::api::state::ApiSettings;
use crate::errors::UseThisLinkError;

/// 当前请求的会话，可直接作为 handler 参数提取
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionId {
    pub id: String,
    /// 本次请求新生成（请求中没有 Cookie）
    pub is_new: bool,
}

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl FromRequest for SessionId {
    type Error = UseThisLinkError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<SessionId>()
                .cloned()
                .ok_or_else(|| UseThisLinkError::internal("session middleware is not installed")),
        )
    }
}

/// 匿名会话 Cookie
pub fn anonymous_cookie(settings: &ApiSettings, session_id: &str) -> Cookie<'static> {
    Cookie::build(settings.cookie_name.clone(), session_id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(settings.anonymous_max_age_secs))
        .finish()
}

/// 登录后重新签发的 Cookie
pub fn login_cookie(settings: &ApiSettings, session_id: &str) -> Cookie<'static> {
    Cookie::build(settings.cookie_name.clone(), session_id.to_string())
        .path("/")
        .http_only(true)
        .secure(settings.secure_cookie)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(settings.login_max_age_secs))
        .finish()
}

/// 退出登录时让 Cookie 立即过期
pub fn expired_cookie(settings: &ApiSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(settings.cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .secure(settings.secure_cookie)
        .same_site(SameSite::Strict)
        .finish();
    cookie.make_removal();
    cookie
}

/// Session 中间件工厂
#[derive(Clone)]
pub struct SessionMiddleware {
    settings: Arc<ApiSettings>,
}

impl SessionMiddleware {
    pub fn new(settings: Arc<ApiSettings>) -> Self {
        Self { settings }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionService {
            service: Rc::new(service),
            settings: self.settings.clone(),
        }))
    }
}

pub struct SessionService<S> {
    service: Rc<S>,
    settings: Arc<ApiSettings>,
}

impl<S, B> Service<ServiceRequest> for SessionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let settings = self.settings.clone();

        let existing = req
            .cookie(&settings.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());

        let session = match existing {
            Some(id) => SessionId { id, is_new: false },
            None => {
                let id = Uuid::new_v4().to_string();
                trace!("New session {}", id);
                SessionId { id, is_new: true }
            }
        };
        req.extensions_mut().insert(session.clone());

        Box::pin(async move {
            let mut response = srv.call(req).await?;

            if session.is_new {
                let already_set = response
                    .response()
                    .cookies()
                    .any(|c| c.name() == settings.cookie_name);

                if !already_set
                    && let Err(e) = response
                        .response_mut()
                        .add_cookie(&anonymous_cookie(&settings, &session.id))
                {
                    warn!("Failed to set session cookie: {}", e);
                }
            }

            Ok(response)
        })
    }
}
