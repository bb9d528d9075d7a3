//! Integration tests for `DeepSeekClient` against a `wiremock` chat endpoint.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use revdash_analysis::{run_analysis, DeepSeekClient};
use revdash_core::{Review, Store};

fn review(native_id: &str, body: &str) -> Review {
    Review {
        id: Review::canonical_id(Store::Play, native_id),
        native_id: native_id.to_owned(),
        store: Store::Play,
        author: "tester".to_owned(),
        rating: 3,
        title: None,
        body: body.to_owned(),
        timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 9, 44, 8).unwrap(),
        app_id: "com.example.app".to_owned(),
        app_version: None,
        raw: serde_json::Value::Null,
    }
}

fn client(server: &MockServer, batch_size: usize) -> DeepSeekClient {
    DeepSeekClient::new(
        &format!("{}/v1/chat/completions", server.uri()),
        "test-key",
        "deepseek-chat",
        batch_size,
    )
    .expect("failed to build test DeepSeekClient")
}

/// A chat completion whose message content is the given results object.
fn completion(results: &serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": results.to_string()},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn failed_batch_is_skipped_and_later_batches_continue() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("first-review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&json!({
            "results": [
                {"sentiment": 2, "entities": ["Push"], "topics": ["notifications"]},
                {"sentiment": 5, "entities": [], "topics": ["design"]}
            ]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("third-review"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("fifth-review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&json!({
            "results": [{"sentiment": "1", "entities": ["push"], "topics": []}]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let reviews = vec![
        review("1", "first-review"),
        review("2", "second-review"),
        review("3", "third-review"),
        review("4", "fourth-review"),
        review("5", "fifth-review"),
    ];
    let run = client(&server, 2).analyze(&reviews).await;

    assert_eq!(run.failed_batches, 1);
    assert!(!run.rate_limited);
    let indices: Vec<_> = run.assessments.iter().map(|a| a.review_index).collect();
    assert_eq!(indices, [0, 1, 4]);
    assert_eq!(run.assessments[2].result.sentiment, Some(1.0));
}

#[tokio::test]
async fn rate_limit_stops_remaining_batches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let reviews = vec![review("1", "a"), review("2", "b"), review("3", "c")];
    let run = client(&server, 1).analyze(&reviews).await;

    assert!(run.rate_limited);
    assert!(run.assessments.is_empty());
    assert_eq!(run.failed_batches, 0);
}

#[tokio::test]
async fn unparseable_content_counts_as_failed_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Sorry, I can't do that."}}]
        })))
        .mount(&server)
        .await;

    let run = client(&server, 5).analyze(&[review("1", "a")]).await;

    assert_eq!(run.failed_batches, 1);
    assert!(run.assessments.is_empty());
}

#[tokio::test]
async fn report_includes_ai_insights() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&json!({
            "results": [
                {"sentiment": 1.5, "entities": ["Сбер ID"], "topics": ["вход"]},
                {"sentiment": 4.5, "entities": ["сбер id"], "topics": ["Вход"]}
            ]
        }))))
        .mount(&server)
        .await;

    let reviews = vec![
        review("1", "Не могу войти через Сбер ID"),
        review("2", "Вход через Сбер ID работает отлично"),
    ];
    let ds = client(&server, 5);
    let report = run_analysis(&reviews, Some(&ds)).await;

    let ai = report.ai.expect("ai insights");
    assert_eq!(ai.analyzed_reviews, 2);
    assert_eq!(ai.entities[0].entity, "сбер id");
    assert_eq!(ai.entities[0].count, 2);
    assert_eq!(ai.topics[0].topic, "вход");
    assert_eq!(ai.topics[0].count, 2);
    assert!((ai.avg_sentiment - 3.0).abs() < 1e-9);
    assert_eq!(ai.positive_count, 1);
    assert_eq!(ai.critical_count, 1);
}
