use newspress::llm::gemini::GeminiProvider;
use newspress::llm::remote::RemoteLlmProvider;
use newspress::llm::{LlmProvider, LlmRequest};

#[tokio::test]
async fn test_remote_provider_with_mock() {
    let mut server = mockito::Server::new_async().await;

    // Mock successful OpenAI response
    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer fake-api-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "model": "gpt-4o-mini",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "This is a test response"
                    },
                    "finish_reason": "stop"
                }],
                "usage": {
                    "prompt_tokens": 10,
                    "completion_tokens": 5,
                    "total_tokens": 15
                }
            }"#,
        )
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let request = LlmRequest {
        prompt: "Test prompt".to_string(),
        max_tokens: Some(100),
        temperature: Some(0.7),
        timeout_seconds: Some(10),
    };

    let result = provider.generate(request).await;

    assert!(result.is_ok());
    let response = result.unwrap();
    assert_eq!(response.content, "This is a test response");
    assert_eq!(response.usage.prompt_tokens, 10);
    assert_eq!(response.usage.completion_tokens, 5);
    assert_eq!(response.usage.total_tokens, 15);
    assert_eq!(response.model, "gpt-4o-mini");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_process_sends_prompt_and_content() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "deepseek-chat",
            "messages": [{ "role": "user", "content": "Summarize:\n\nArticle body" }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "choices": [{ "message": { "role": "assistant", "content": "Short summary" } }]
            }"#,
        )
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "ds-key", "deepseek-chat");

    let text = provider.process("Summarize:", "Article body").await.unwrap();
    assert_eq!(text, "Short summary");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_without_key_sends_no_auth_header() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("authorization", mockito::Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "choices": [{ "message": { "role": "assistant", "content": "ok" } }] }"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "", "llama3.1");
    assert_eq!(provider.process("ping", "").await.unwrap(), "ok");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_error_handling() {
    let mut server = mockito::Server::new_async().await;

    // Mock API error
    let mock = server
        .mock("POST", "/")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Rate limit exceeded"}}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let request = LlmRequest {
        prompt: "Test".to_string(),
        max_tokens: None,
        temperature: None,
        timeout_seconds: None,
    };

    let result = provider.generate(request).await;

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("429"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_timeout() {
    let mut server = mockito::Server::new_async().await;

    // Mock slow response
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_secs(3));
            w.write_all(b"too late")
        })
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let request = LlmRequest {
        prompt: "Test".to_string(),
        max_tokens: None,
        temperature: None,
        timeout_seconds: Some(1), // 1 second timeout
    };

    let result = provider.generate(request).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("timed out"));
}

#[tokio::test]
async fn test_gemini_provider_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/models/gemini-1.5-flash:generateContent")
        .match_query(mockito::Matcher::UrlEncoded("key".into(), "g-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "world" }] },
                    "finishReason": "STOP",
                    "index": 0
                }],
                "usageMetadata": { "promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6 },
                "modelVersion": "gemini-1.5-flash-002"
            }"#,
        )
        .create_async()
        .await;

    let provider = GeminiProvider::new(server.url(), "g-key", "gemini-1.5-flash");
    let response = provider
        .generate(LlmRequest {
            prompt: "Say hello".to_string(),
            max_tokens: None,
            temperature: None,
            timeout_seconds: Some(10),
        })
        .await
        .unwrap();

    assert_eq!(response.content, "Hello world");
    assert_eq!(response.usage.total_tokens, 6);
    assert_eq!(response.model, "gemini-1.5-flash-002");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_gemini_provider_empty_candidates() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/models/gemini-1.5-flash:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "candidates": [] }"#)
        .create_async()
        .await;

    let provider = GeminiProvider::new(server.url(), "g-key", "gemini-1.5-flash");
    let err = provider.process("Say hello", "").await.unwrap_err();
    assert!(err.to_string().contains("no candidates"));
}
