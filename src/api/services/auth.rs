use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use super::{client_ip, user_agent};
use crate::api::middleware::{SessionId, expired_cookie, login_cookie};
use crate::api::state::ApiSettings;
use crate::errors::{Result, UseThisLinkError};
use crate::services::{AuthService, MSG_INVALID_REQUEST, MSG_NO_SESSION};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

type JsonBody<T> = std::result::Result<web::Json<T>, actix_web::Error>;

fn require_body<T>(body: JsonBody<T>) -> Result<T> {
    body.map(web::Json::into_inner)
        .map_err(|_| UseThisLinkError::validation(MSG_INVALID_REQUEST))
}

pub struct AuthHandler;

impl AuthHandler {
    /// POST /api/register
    pub async fn register(
        body: JsonBody<CredentialsRequest>,
        auth: web::Data<Arc<AuthService>>,
    ) -> Result<HttpResponse> {
        let body = require_body(body)?;
        auth.register(&body.email, &body.password).await?;
        Ok(HttpResponse::Ok().json(json!({ "status": "otp_sent" })))
    }

    /// POST /api/verify-otp
    pub async fn verify_otp(
        body: JsonBody<VerifyOtpRequest>,
        auth: web::Data<Arc<AuthService>>,
    ) -> Result<HttpResponse> {
        let body = require_body(body)?;
        auth.verify_otp(&body.email, &body.otp).await?;
        Ok(HttpResponse::Ok().json(json!({ "status": "registered" })))
    }

    /// POST /api/login
    pub async fn login(
        req: HttpRequest,
        session: SessionId,
        body: JsonBody<CredentialsRequest>,
        auth: web::Data<Arc<AuthService>>,
        settings: web::Data<Arc<ApiSettings>>,
    ) -> Result<HttpResponse> {
        let body = require_body(body)?;
        let ua = user_agent(&req);
        let ip = client_ip(&req, &settings);

        auth.login(
            session.as_str(),
            &body.email,
            &body.password,
            ua.as_deref(),
            ip.as_deref(),
        )
        .await?;

        Ok(HttpResponse::Ok()
            .cookie(login_cookie(&settings, session.as_str()))
            .json(json!({ "status": "logged_in" })))
    }

    /// POST /api/logout
    pub async fn logout(
        session: SessionId,
        auth: web::Data<Arc<AuthService>>,
        settings: web::Data<Arc<ApiSettings>>,
    ) -> Result<HttpResponse> {
        // 请求没有带 Cookie
        if session.is_new {
            return Err(UseThisLinkError::unauthorized(MSG_NO_SESSION));
        }

        auth.logout(session.as_str()).await?;

        Ok(HttpResponse::Ok()
            .cookie(expired_cookie(&settings))
            .json(json!({ "status": "logged_out" })))
    }

    /// GET /api/session
    pub async fn session_status(
        session: SessionId,
        auth: web::Data<Arc<AuthService>>,
    ) -> Result<HttpResponse> {
        if session.is_new {
            return Ok(HttpResponse::Ok().json(json!({ "logged_in": false })));
        }

        let body = match auth.session_email(session.as_str()).await? {
            Some(email) => json!({ "logged_in": true, "email": email }),
            None => json!({ "logged_in": false }),
        };
        Ok(HttpResponse::Ok().json(body))
    }
}
