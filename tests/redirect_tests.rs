//! GET /{shortcode}
//!
//! 302 跳转、访问计数、爬虫过滤与后台访问记录。

mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use serde_json::Value;
use usethislink::services::ClientContext;

use common::{
    CHROME_UA, GOOGLEBOT_UA, app, code_of, session_cookie, setup, wait_for_access_logs,
};

async fn shorten(env: &common::TestEnv, url: &str) -> String {
    let short_url = env
        .state
        .link_service
        .shorten("creator", Some(url), ClientContext::default())
        .await
        .unwrap();
    code_of(&short_url)
}

#[actix_rt::test]
async fn test_redirect_found_and_counted() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;
    let code = shorten(&env, "https://example.com/landing").await;

    let req = TestRequest::get()
        .uri(&format!("/{}", code))
        .insert_header((header::USER_AGENT, CHROME_UA))
        .peer_addr("8.8.8.8:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://example.com/landing"
    );

    wait_for_access_logs(&env.storage, &code, 1).await;
    let link = env.storage.get_link(&code).await.unwrap().unwrap();
    assert_eq!(link.visits, 1);

    let summary = env
        .storage
        .get_link_analytics(&code)
        .await
        .unwrap()
        .expect("analytics row should exist");
    assert_eq!(summary.redirect_count, 1);
    assert_eq!(summary.unique_visitors, 1);
    assert_eq!(summary.country_counts.get("Germany"), Some(&1));
    assert_eq!(summary.device_counts.get("Desktop"), Some(&1));
}

#[actix_rt::test]
async fn test_bot_is_redirected_but_not_counted() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;
    let code = shorten(&env, "https://example.com/bots").await;

    let req = TestRequest::get()
        .uri(&format!("/{}", code))
        .insert_header((header::USER_AGENT, GOOGLEBOT_UA))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://example.com/bots"
    );

    // 给可能的后台任务留出时间
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let link = env.storage.get_link(&code).await.unwrap().unwrap();
    assert_eq!(link.visits, 0);
    assert_eq!(env.storage.count_access_logs(&code).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_unknown_code_is_not_found() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/zzzz9999").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Short URL not found");
}

#[actix_rt::test]
async fn test_malformed_code_is_not_found() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;

    for path in ["/ab", "/toolongcode1", "/bad-code"] {
        let resp = test::call_service(&app, TestRequest::get().uri(path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "path {}", path);
    }
}

#[actix_rt::test]
async fn test_repeat_visitor_counted_once_as_unique() {
    let env = setup().await;
    let app = test::init_service(app(&env.state)).await;
    let code = shorten(&env, "https://example.com/repeat").await;

    for expected in 1..=2u64 {
        let req = TestRequest::get()
            .uri(&format!("/{}", code))
            .cookie(session_cookie("visitor-1"))
            .insert_header((header::USER_AGENT, CHROME_UA))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        wait_for_access_logs(&env.storage, &code, expected).await;
    }

    let summary = env.storage.get_link_analytics(&code).await.unwrap().unwrap();
    assert_eq!(summary.total_visits, 2);
    assert_eq!(summary.unique_visitors, 1);
    // 无对端地址
    assert_eq!(summary.country_counts.get("Unknown"), Some(&2));
}
