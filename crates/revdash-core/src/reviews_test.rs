use super::*;

fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid rfc3339 fixture")
        .with_timezone(&Utc)
}

fn make_review(store: Store, native_id: &str, title: Option<&str>) -> Review {
    Review {
        id: Review::canonical_id(store, native_id),
        native_id: native_id.to_owned(),
        store,
        author: "Anna".to_owned(),
        rating: 4,
        title: title.map(str::to_owned),
        body: "Works fine".to_owned(),
        timestamp: ts("2025-06-02T16:44:08Z"),
        app_id: "com.example".to_owned(),
        app_version: None,
        raw: serde_json::Value::Null,
    }
}

#[test]
fn store_serializes_as_snake_case() {
    assert_eq!(
        serde_json::to_string(&Store::AppStore).unwrap(),
        "\"app_store\""
    );
    assert_eq!(serde_json::to_string(&Store::Play).unwrap(), "\"play\"");
}

#[test]
fn canonical_id_prefixes_store() {
    assert_eq!(Review::canonical_id(Store::Play, "gp:abc"), "play:gp:abc");
    assert_eq!(Review::canonical_id(Store::AppStore, "123"), "app_store:123");
}

#[test]
fn full_text_joins_title_and_body() {
    let review = make_review(Store::AppStore, "1", Some("Great"));
    assert_eq!(review.full_text(), "Great Works fine");
    let review = make_review(Store::Play, "1", None);
    assert_eq!(review.full_text(), "Works fine");
}

#[test]
fn source_method_from_position() {
    assert_eq!(
        SourceMethod::from_position(0, "rss_json"),
        SourceMethod::Primary {
            name: "rss_json".to_owned()
        }
    );
    let fallback = SourceMethod::from_position(1, "rss_xml");
    assert!(fallback.is_fallback());
    assert_eq!(fallback.name(), "rss_xml");
    assert_eq!(fallback.to_string(), "fallback 1 (rss_xml)");
}

#[test]
fn date_window_from_dates_is_inclusive_of_whole_end_day() {
    let window = DateWindow::from_dates(
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
    );
    assert!(window.contains(ts("2025-06-01T00:00:00Z")));
    assert!(window.contains(ts("2025-06-02T23:59:59Z")));
    assert!(!window.contains(ts("2025-06-03T00:00:00Z")));
    assert!(!window.contains(ts("2025-05-31T23:59:59Z")));
}

#[test]
fn inverted_window_is_empty() {
    let window = DateWindow::new(ts("2025-06-02T00:00:00Z"), ts("2025-06-01T00:00:00Z"));
    assert!(window.is_empty());
    assert!(!window.contains(ts("2025-06-01T12:00:00Z")));
}

#[test]
fn ingestion_result_counts_and_degradation() {
    let mut result = IngestionResult {
        reviews: vec![
            make_review(Store::Play, "a", None),
            make_review(Store::Play, "b", None),
            make_review(Store::AppStore, "1", Some("t")),
        ],
        ..IngestionResult::default()
    };
    assert_eq!(result.count_for(Store::Play), 2);
    assert_eq!(result.count_for(Store::AppStore), 1);
    assert!(!result.is_degraded());

    result.record_failure(Store::Play, FailureKind::InvalidRecord, "rating 0");
    assert!(!result.is_degraded());

    result.record_failure(Store::AppStore, FailureKind::SourceUnavailable, "all failed");
    assert!(result.is_degraded());
}

#[test]
fn ingestion_result_serializes_source_method_by_store() {
    let mut result = IngestionResult::default();
    result
        .source_method
        .insert(Store::AppStore, SourceMethod::from_position(1, "rss_xml"));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["source_method"]["app_store"]["rank"], "fallback");
    assert_eq!(json["source_method"]["app_store"]["index"], 1);
}
