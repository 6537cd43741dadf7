//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionRequest, LanguageModel, LlmConfig, LlmError, LlmMessage};

/// Cap on how much of an error body is kept for logging
const MAX_ERROR_BODY: usize = 2048;

/// Client for `POST {api_url}/chat/completions`
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model_override: Option<String>,
}

impl OpenAiCompatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Config("LLM_API_KEY is not set".into()))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            model_override: config.model_override.clone(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }
}

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
}

#[derive(Deserialize)]
struct ChatApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: serde_json::Value,
}

impl ChatApiResponse {
    /// First choice's text. Anything other than a plain string (missing,
    /// null, multi-part content) counts as an empty reply.
    fn into_reply(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| match m.content {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let model = self.model_override.as_deref().unwrap_or(&request.model);
        tracing::debug!(model, messages = request.messages.len(), "Sending chat completion");

        let response = self
            .http
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(&ChatApiRequest {
                model,
                messages: &request.messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response.json::<ChatApiResponse>().await?;
        Ok(parsed.into_reply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> LlmConfig {
        LlmConfig {
            api_url: server.uri(),
            api_key: Some("sk-test".into()),
            ..LlmConfig::default()
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "kimi-k2".into(),
            messages: vec![LlmMessage::user("hi")],
        }
    }

    #[test]
    fn requires_api_key() {
        let err = OpenAiCompatClient::new(&LlmConfig::default()).unwrap_err();
        assert!(matches!(err, LlmError::Config(_)));
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(json!({
                "model": "kimi-k2",
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hello there"}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config(&server)).unwrap();
        let reply = client.complete(&request()).await.unwrap();
        assert_eq!(reply, "hello there");
    }

    #[tokio::test]
    async fn model_override_replaces_requested_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .mount(&server)
            .await;

        let mut cfg = config(&server);
        cfg.model_override = Some("gpt-4o-mini".into());
        let client = OpenAiCompatClient::new(&cfg).unwrap();
        assert_eq!(client.complete(&request()).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn non_string_content_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": [{"type": "text", "text": "x"}]}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config(&server)).unwrap();
        assert_eq!(client.complete(&request()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config(&server)).unwrap();
        let err = client.complete(&request()).await.unwrap_err();
        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
