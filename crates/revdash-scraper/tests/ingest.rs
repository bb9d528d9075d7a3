//! End-to-end ingestion against one `wiremock` server standing in for both stores.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use revdash_core::{DateWindow, FailureKind, Store};
use revdash_scraper::{
    AppStoreAdapter, AppStoreSettings, FetchLimits, HttpClient, IngestRequest, Ingestor,
    PlayAdapter, PlaySettings,
};

fn ingestor(server: &MockServer) -> Ingestor {
    let http = HttpClient::new(5, "revdash-test/0.1", 0, 0).expect("failed to build test HttpClient");
    let limits = FetchLimits {
        max_reviews: 50,
        inter_request_delay_ms: 0,
    };
    Ingestor::new(
        PlayAdapter::new(
            http.clone(),
            PlaySettings {
                base_url: server.uri(),
                lang: "ru".to_owned(),
                country: "ru".to_owned(),
            },
            limits,
        ),
        AppStoreAdapter::new(
            http,
            AppStoreSettings {
                base_url: server.uri(),
                country: "ru".to_owned(),
            },
            limits,
        ),
    )
}

fn june_request() -> IngestRequest {
    IngestRequest {
        play_app_id: Some("com.example.app".to_owned()),
        app_store_app_id: Some("123456789".to_owned()),
        window: DateWindow::from_dates(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        ),
        debug: false,
    }
}

fn app_store_entry(id: &str, rating: &str, updated: &str) -> serde_json::Value {
    json!({
        "author": {"name": {"label": "maria_k"}},
        "updated": {"label": updated},
        "im:rating": {"label": rating},
        "id": {"label": id},
        "title": {"label": ""},
        "content": {"label": "Текст отзыва"}
    })
}

#[tokio::test]
async fn play_outage_still_returns_app_store_reviews() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_/PlayStoreUi/data/batchexecute"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(
            "/ru/rss/customerreviews/page=1/id=123456789/sortby=mostrecent/json",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"feed": {"entry": [
            app_store_entry("late", "5", "2025-06-20T08:00:00-07:00"),
            app_store_entry("early", "2", "2025-06-02T09:44:08-07:00"),
            app_store_entry("zero", "0", "2025-06-03T09:00:00-07:00"),
            app_store_entry("may", "4", "2025-05-30T09:00:00-07:00"),
        ]}})))
        .mount(&server)
        .await;

    let result = ingestor(&server).ingest(&june_request()).await;

    let ids: Vec<_> = result.reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["app_store:early", "app_store:late"]);
    assert_eq!(
        result.reviews[0].timestamp.to_rfc3339(),
        "2025-06-02T16:44:08+00:00"
    );
    assert!(result.reviews[0].title.is_none());

    let play_failures: Vec<_> = result
        .errors
        .iter()
        .filter(|e| e.store == Store::Play)
        .collect();
    assert_eq!(play_failures.len(), 1);
    assert_eq!(play_failures[0].kind, FailureKind::SourceUnavailable);

    let invalid: Vec<_> = result
        .errors
        .iter()
        .filter(|e| e.kind == FailureKind::InvalidRecord)
        .collect();
    assert_eq!(invalid.len(), 1, "rating 0 is rejected");
    assert_eq!(invalid[0].store, Store::AppStore);

    assert!(result.source_method.contains_key(&Store::AppStore));
    assert!(!result.source_method.contains_key(&Store::Play));
}

#[tokio::test]
async fn nothing_reachable_yields_errors_not_a_panic() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/ru/rss/.*"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = ingestor(&server).ingest(&june_request()).await;

    assert!(result.reviews.is_empty());
    assert_eq!(result.errors.len(), 2);
    assert!(result
        .errors
        .iter()
        .all(|e| e.kind == FailureKind::SourceUnavailable));
}
