//! SeaOrmStorage against a temporary SQLite database

mod common;

use chrono::{Duration, Utc};

use common::setup;
use usethislink::storage::{AccessRecord, ShortLink, VisitType};

fn link(code: &str, url: &str, session: &str) -> ShortLink {
    ShortLink {
        code: code.to_string(),
        original_url: url.to_string(),
        session_id: session.to_string(),
        user_email: None,
        visits: 0,
        created_at: Utc::now(),
        expiry_date: None,
        is_logged_in: false,
    }
}

fn access(code: &str, session: Option<&str>, visit_type: VisitType, country: &str) -> AccessRecord {
    AccessRecord {
        short_url: code.to_string(),
        session_id: session.map(String::from),
        ip_address: Some("8.8.8.8".to_string()),
        user_agent: None,
        referrer: None,
        accessed_at: Utc::now(),
        visit_type,
        city: "Unknown".to_string(),
        country: country.to_string(),
        browser: "Firefox 121.0".to_string(),
        device: "Desktop".to_string(),
        operating_system: "Linux".to_string(),
    }
}

#[actix_rt::test]
async fn test_insert_if_absent_keeps_first_row() {
    let env = setup().await;
    let storage = &env.storage;

    assert!(storage
        .insert_link_if_absent(&link("abcd1234", "https://one.example", "s1"))
        .await
        .unwrap());
    assert!(!storage
        .insert_link_if_absent(&link("abcd1234", "https://two.example", "s2"))
        .await
        .unwrap());

    let stored = storage.get_link("abcd1234").await.unwrap().unwrap();
    assert_eq!(stored.original_url, "https://one.example");
    assert_eq!(stored.session_id, "s1");
    assert!(storage.get_link("missing1").await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_increment_visits() {
    let env = setup().await;
    let storage = &env.storage;
    storage
        .insert_link_if_absent(&link("visit001", "https://v.example", "s1"))
        .await
        .unwrap();

    for _ in 0..3 {
        storage.increment_visits("visit001").await.unwrap();
    }
    // 不存在的短码不报错
    storage.increment_visits("nothere1").await.unwrap();

    assert_eq!(storage.get_link("visit001").await.unwrap().unwrap().visits, 3);
}

#[actix_rt::test]
async fn test_history_orders_newest_first_and_claims() {
    let env = setup().await;
    let storage = &env.storage;

    let mut older = link("old00001", "https://old.example", "s1");
    older.created_at = Utc::now() - Duration::minutes(5);
    storage.insert_link_if_absent(&older).await.unwrap();
    storage
        .insert_link_if_absent(&link("new00001", "https://new.example", "s1"))
        .await
        .unwrap();
    storage
        .insert_link_if_absent(&link("other001", "https://other.example", "s2"))
        .await
        .unwrap();

    let history = storage.list_history("s1", None).await.unwrap();
    let codes: Vec<&str> = history.iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes, ["new00001", "old00001"]);

    let claimed = storage
        .claim_session_links("s1", "bob@example.com")
        .await
        .unwrap();
    assert_eq!(claimed, 2);

    // 新会话登录同一用户后仍能看到
    let history = storage
        .list_history("s3", Some("bob@example.com"))
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|l| l.is_logged_in));
    assert!(history
        .iter()
        .all(|l| l.user_email.as_deref() == Some("bob@example.com")));
}

#[actix_rt::test]
async fn test_sessions() {
    let env = setup().await;
    let storage = &env.storage;

    storage
        .ensure_session("sess-1", Some("curl/8.0"), Some("127.0.0.1"))
        .await
        .unwrap();
    // 重复写入被忽略
    storage.ensure_session("sess-1", None, None).await.unwrap();
    assert_eq!(storage.get_session_email("sess-1").await.unwrap(), None);

    storage
        .set_session_email("sess-1", Some("carol@example.com"))
        .await
        .unwrap();
    assert_eq!(
        storage.get_session_email("sess-1").await.unwrap().as_deref(),
        Some("carol@example.com")
    );

    storage.set_session_email("sess-1", None).await.unwrap();
    assert_eq!(storage.get_session_email("sess-1").await.unwrap(), None);
    assert_eq!(storage.get_session_email("unknown").await.unwrap(), None);
}

#[actix_rt::test]
async fn test_record_access_aggregates() {
    let env = setup().await;
    let storage = &env.storage;
    storage
        .insert_link_if_absent(&link("agg00001", "https://agg.example", "s1"))
        .await
        .unwrap();

    storage
        .record_access(&access("agg00001", Some("a"), VisitType::Redirect, "India"))
        .await
        .unwrap();
    storage
        .record_access(&access("agg00001", Some("a"), VisitType::Redirect, "India"))
        .await
        .unwrap();
    storage
        .record_access(&access("agg00001", Some("b"), VisitType::Preview, "Japan"))
        .await
        .unwrap();

    let summary = storage.get_link_analytics("agg00001").await.unwrap().unwrap();
    assert_eq!(summary.total_visits, 3);
    assert_eq!(summary.unique_visitors, 2);
    assert_eq!(summary.redirect_count, 2);
    assert_eq!(summary.preview_count, 1);
    assert_eq!(summary.country_counts.get("India"), Some(&2));
    assert_eq!(summary.country_counts.get("Japan"), Some(&1));
    assert_eq!(summary.browser_counts.get("Firefox 121.0"), Some(&3));
    assert_eq!(summary.device_counts.get("Desktop"), Some(&3));
    assert!(summary.last_updated.is_some());

    assert_eq!(storage.count_access_logs("agg00001").await.unwrap(), 3);

    let days = storage.daily_visit_counts().await.unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].count, 3);
    assert_eq!(days[0].day, Utc::now().format("%Y-%m-%d").to_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_record_access_keeps_every_visit() {
    let env = setup().await;
    env.storage
        .insert_link_if_absent(&link("busy0001", "https://busy.example", "s1"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..40)
        .map(|i| {
            let storage = env.storage.clone();
            tokio::spawn(async move {
                let session = format!("visitor-{}", i);
                storage
                    .record_access(&access(
                        "busy0001",
                        Some(&session),
                        VisitType::Redirect,
                        "Germany",
                    ))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let summary = env.storage.get_link_analytics("busy0001").await.unwrap().unwrap();
    assert_eq!(summary.total_visits, 40);
    assert_eq!(summary.unique_visitors, 40);
    assert_eq!(summary.redirect_count, 40);
    assert_eq!(summary.country_counts.get("Germany"), Some(&40));
    assert_eq!(env.storage.count_access_logs("busy0001").await.unwrap(), 40);
}

#[actix_rt::test]
async fn test_ping() {
    let env = setup().await;
    env.storage.ping().await.unwrap();
    assert_eq!(env.storage.get_backend_name(), "sqlite");
}
