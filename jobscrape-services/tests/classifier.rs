//! OpenAI classifier against a mock chat endpoint.

use jobscrape_core::{ClassificationLabel, Classifier, JobRecord, SiteKind};
use jobscrape_services::{DEFAULT_MODEL, OpenAiClassifier};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn job(description: Option<&str>) -> JobRecord {
    let mut job = JobRecord::new(SiteKind::Agrilabour, "https://example.com/job/1");
    job.title = Some("Fruit Picker".into());
    job.salary = Some("$30 per hour".into());
    job.description = description.map(String::from);
    job
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

async fn classifier(server: &MockServer) -> OpenAiClassifier {
    OpenAiClassifier::new("sk-test", DEFAULT_MODEL)
        .unwrap()
        .with_endpoint(format!("{}/v1/chat/completions", server.uri()))
}

#[tokio::test]
async fn test_answers_map_to_labels() {
    for (answer, expected) in [
        ("yes", ClassificationLabel::Yes),
        ("No.", ClassificationLabel::No),
        ("  Maybe\n", ClassificationLabel::Maybe),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({ "model": "gpt-3.5-turbo" })))
            .respond_with(completion(answer))
            .expect(1)
            .mount(&server)
            .await;

        let label = classifier(&server).await.classify(&job(Some("Pick apples"))).await;
        assert_eq!(label, expected, "answer {answer:?}");
    }
}

#[tokio::test]
async fn test_request_carries_listing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [{ "role": "system", "content": "You are a helpful assistant." }]
        })))
        .respond_with(completion("yes"))
        .mount(&server)
        .await;

    let classifier = classifier(&server).await;
    assert_eq!(
        classifier.classify(&job(Some("Pick apples"))).await,
        ClassificationLabel::Yes
    );

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Title: Fruit Picker"));
    assert!(user.contains("Salary: $30 per hour"));
    assert!(user.ends_with("Description: Pick apples"));
}

#[tokio::test]
async fn test_empty_description_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("yes"))
        .expect(0)
        .mount(&server)
        .await;

    let classifier = classifier(&server).await;
    assert_eq!(classifier.classify(&job(None)).await, ClassificationLabel::No);
    assert_eq!(
        classifier.classify(&job(Some("   "))).await,
        ClassificationLabel::No
    );
}

#[tokio::test]
async fn test_failures_become_error_label() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let label = classifier(&server).await.classify(&job(Some("Pick apples"))).await;
    assert_eq!(label, ClassificationLabel::Error);
}

#[tokio::test]
async fn test_unexpected_answer_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("Probably suitable for a backpacker"))
        .mount(&server)
        .await;

    let label = classifier(&server).await.classify(&job(Some("Pick apples"))).await;
    assert_eq!(label, ClassificationLabel::Error);
}
