//! Unit tests for the OpenAI-compatible reviewing agent.

use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::agent::ReviewAgent;
use crate::error::ReviewError;
use crate::review::change_set::ChangeSet;
use crate::review::model::{ProposedComment, ReviewInstruction};

use super::{
    ChatCompletionsResponse, OpenAiReviewAgent, OpenAiReviewAgentConfig, parse_review_reply,
};

#[fixture]
fn instruction() -> ReviewInstruction {
    ReviewInstruction::new("English", "Keep functions small.")
}

fn agent_for(server: &MockServer) -> OpenAiReviewAgent {
    OpenAiReviewAgent::new(OpenAiReviewAgentConfig::new(
        server.uri(),
        "test-model",
        Some("sk-test".to_owned()),
        Duration::from_secs(5),
    ))
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

fn decode(value: serde_json::Value) -> ChatCompletionsResponse {
    serde_json::from_value(value).expect("completion should decode")
}

#[rstest]
#[tokio::test]
async fn review_requires_api_key(instruction: ReviewInstruction) {
    let agent = OpenAiReviewAgent::default();
    let error = agent
        .review(&instruction, &ChangeSet::default(), &[])
        .await
        .expect_err("missing key should be rejected");

    assert!(
        matches!(error, ReviewError::Configuration { .. }),
        "expected missing API key to map to Configuration error, got {error:?}"
    );
}

#[rstest]
#[tokio::test]
async fn review_sends_structured_request_and_parses_comments(instruction: ReviewInstruction) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "response_format": { "type": "json_schema", "json_schema": { "name": "comments" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(
            r#"{"comments":[{"commentLine":10,"filepath":"file1.ts","comment":"Consider renaming this variable."}]}"#
        ))))
        .expect(1)
        .mount(&server)
        .await;

    let comments = agent_for(&server)
        .review(&instruction, &ChangeSet::default(), &[])
        .await
        .expect("review should succeed");

    assert_eq!(
        comments,
        Some(vec![ProposedComment {
            comment_line: 10,
            filepath: "file1.ts".to_owned(),
            comment: "Consider renaming this variable.".to_owned(),
        }])
    );
}

#[rstest]
#[tokio::test]
async fn review_maps_non_success_status_to_agent_error(instruction: ReviewInstruction) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let error = agent_for(&server)
        .review(&instruction, &ChangeSet::default(), &[])
        .await
        .expect_err("429 should fail");

    assert_eq!(
        error,
        ReviewError::Agent {
            message: "AI request failed with status 429: rate limited".to_owned(),
        }
    );
}

#[rstest]
#[tokio::test]
async fn review_maps_unreachable_endpoint_to_network_error(instruction: ReviewInstruction) {
    let server = MockServer::start().await;
    let agent = agent_for(&server);
    drop(server);

    let error = agent
        .review(&instruction, &ChangeSet::default(), &[])
        .await
        .expect_err("request should fail");

    assert!(matches!(error, ReviewError::Network { .. }), "got {error:?}");
}

#[rstest]
#[case::no_choices(json!({ "choices": [] }))]
#[case::null_content(completion(serde_json::Value::Null))]
#[case::blank_content(completion(json!("  ")))]
#[case::refusal(json!({
    "choices": [{ "message": { "content": null, "refusal": "I can't help with that." } }]
}))]
fn unusable_but_well_formed_replies_are_absent(#[case] reply: serde_json::Value) {
    let parsed = parse_review_reply(decode(reply)).expect("absent reply is not an error");
    assert_eq!(parsed, None);
}

#[rstest]
fn empty_comment_list_is_present_but_empty() {
    let parsed = parse_review_reply(decode(completion(json!(r#"{"comments":[]}"#))))
        .expect("empty list should parse");
    assert_eq!(parsed, Some(Vec::new()));
}

#[rstest]
#[case::not_json(completion(json!("Looks good to me!")))]
#[case::wrong_shape(completion(json!(r#"{"remarks":[]}"#)))]
#[case::negative_line(completion(json!(
    r#"{"comments":[{"commentLine":-3,"filepath":"a.ts","comment":"x"}]}"#
)))]
fn malformed_replies_are_agent_errors(#[case] reply: serde_json::Value) {
    let error = parse_review_reply(decode(reply)).expect_err("malformed reply should fail");
    assert!(matches!(error, ReviewError::Agent { .. }), "got {error:?}");
}
