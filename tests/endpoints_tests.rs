//! health、二维码、管理接口与请求 ID

mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::Value;

use common::{app, setup};
use usethislink::api::configure_app;
use usethislink::api::middleware::{RequestIdMiddleware, SessionMiddleware};
use usethislink::api::constants::REQUEST_ID_HEADER;
use usethislink::services::ClientContext;

#[actix_rt::test]
async fn test_health_ok() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");

    let resp = test::call_service(
        &app,
        TestRequest::default()
            .method(actix_web::http::Method::HEAD)
            .uri("/health")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_health_unavailable_after_close() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;

    env.storage.get_db().clone().close().await.unwrap();

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unavailable");
}

#[actix_rt::test]
async fn test_qrcode_png() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/qrcode?data=http%3A%2F%2Fshort.test%2Fabcd1234")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
}

#[actix_rt::test]
async fn test_qrcode_requires_data() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;

    for uri in ["/api/qrcode", "/api/qrcode?data="] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing data parameter");
    }
}

#[actix_rt::test]
async fn test_admin_requires_bearer_token() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;

    let resp =
        test::call_service(&app, TestRequest::get().uri("/admin/analytics").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/admin/analytics")
            .insert_header((header::AUTHORIZATION, "Bearer wrong"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_admin_daily_analytics() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;

    let short_url = env
        .state
        .link_service
        .shorten("s1", Some("https://daily.example.com"), ClientContext::default())
        .await
        .unwrap();
    let code = common::code_of(&short_url);
    for _ in 0..2 {
        let req = TestRequest::get().uri(&format!("/{}", code)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
    }
    common::wait_for_access_logs(&env.storage, &code, 2).await;

    let days: Value = test::call_and_read_body_json(
        &app,
        TestRequest::get()
            .uri("/admin/analytics")
            .insert_header((header::AUTHORIZATION, "Bearer admin-secret"))
            .to_request(),
    )
    .await;
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["count"], 2);
    assert_eq!(days[0]["day"].as_str().unwrap().len(), 10);
}

#[actix_rt::test]
async fn test_admin_disabled_without_token() {
    let mut config = common::test_config();
    config.admin.token = String::new();
    let env = common::setup_with(config).await;
    let app = test::init_service(app(&env.state)).await;

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/admin/analytics")
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_request_id_on_full_stack() {
    let env = setup().await;
    let state = env.state.clone();
    let app = test::init_service(
        App::new()
            .wrap(SessionMiddleware::new(state.settings.clone()))
            .wrap(RequestIdMiddleware)
            .configure(move |cfg: &mut web::ServiceConfig| configure_app(cfg, &state)),
    )
    .await;

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/health")
            .insert_header((REQUEST_ID_HEADER, "trace-abc-123"))
            .to_request(),
    )
    .await;
    assert_eq!(
        resp.headers().get(REQUEST_ID_HEADER).unwrap(),
        "trace-abc-123"
    );

    // 错误响应同样带请求 ID
    let resp =
        test::call_service(&app, TestRequest::get().uri("/stats/zzzz0000").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
}
