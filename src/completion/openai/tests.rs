use super::*;
use serde_json::json;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiChatClient {
    let base_url = Url::parse(&format!("{}/v1/", server.uri())).expect("valid mock server url");
    let transport = HttpTransport::new(
        base_url,
        Some("sk-test".to_string()),
        Duration::from_secs(5),
    );
    OpenAiChatClient::with_transport(transport, "test-chat".to_string())
}

#[test]
fn client_configuration() {
    let provider = ProviderConfig {
        completion_model: "gpt-4o-mini".to_string(),
        base_url: "http://localhost:8080/v1".to_string(),
        ..ProviderConfig::default()
    };
    let client = OpenAiChatClient::new(&provider).expect("Failed to create client");

    assert_eq!(client.model(), "gpt-4o-mini");
    assert_eq!(
        client.transport.base_url().as_str(),
        "http://localhost:8080/v1/"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "test-chat",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hello?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hi there."},
                    "finish_reason": "stop"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reply = tokio::task::spawn_blocking(move || {
        client.complete(&[ChatMessage::system("be brief"), ChatMessage::user("hello?")])
    })
    .await
    .expect("blocking task completes")
    .expect("completion succeeds");

    assert_eq!(reply, "Hi there.");
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_choices_is_a_completion_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = tokio::task::spawn_blocking(move || client.complete(&[ChatMessage::user("hi")]))
        .await
        .expect("blocking task completes");

    assert!(matches!(result, Err(RagError::CompletionService(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn http_failure_is_a_completion_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = tokio::task::spawn_blocking(move || client.complete(&[ChatMessage::user("hi")]))
        .await
        .expect("blocking task completes");

    match result {
        Err(RagError::CompletionService(message)) => assert!(message.contains("401")),
        other => panic!("unexpected result: {:?}", other),
    }
}
