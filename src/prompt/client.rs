use super::PromptError;
use crate::settings::{PromptMode, PromptSettings};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const SYSTEM_MESSAGE: &str = "You are a helpful assistant for drawing prompts.";
pub const USER_MESSAGE: &str =
    "Give me a simple object for the user to draw using 1 word. Make it random each time.";
const MAX_TOKENS: u32 = 50;
const USER_AGENT: &str = "layered-sketch prompt client";

/// Anything that can come up with a drawing subject. Called off the UI thread.
pub trait PromptSource: Send + Sync {
    fn fetch_prompt(&self) -> Result<String, PromptError>;
}

fn http_client(timeout_seconds: u64) -> Result<Client, PromptError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.max(1)))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| PromptError::Request(err.to_string()))
}

/// Sends the request and returns the body of a 2xx response.
fn send(request: reqwest::blocking::RequestBuilder) -> Result<String, PromptError> {
    let response = request
        .send()
        .map_err(|err| PromptError::Request(err.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| PromptError::Request(err.to_string()))?;
    if !status.is_success() {
        return Err(PromptError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Relay that keeps the API key server-side and answers `{"prompt": "..."}`.
pub struct ProxyPromptSource {
    client: Client,
    endpoint: String,
}

impl ProxyPromptSource {
    pub fn new(endpoint: impl Into<String>, timeout_seconds: u64) -> Result<Self, PromptError> {
        Ok(Self {
            client: http_client(timeout_seconds)?,
            endpoint: endpoint.into(),
        })
    }
}

impl PromptSource for ProxyPromptSource {
    fn fetch_prompt(&self) -> Result<String, PromptError> {
        tracing::debug!(endpoint = %self.endpoint, "requesting prompt from proxy");
        let body = send(self.client.post(&self.endpoint))?;
        parse_proxy_response(&body)
    }
}

/// Talks to the chat completions API directly.
pub struct ChatCompletionsSource {
    client: Client,
    endpoint: String,
    model: String,
    api_key_env: String,
}

impl ChatCompletionsSource {
    pub fn new(settings: &PromptSettings) -> Result<Self, PromptError> {
        Ok(Self {
            client: http_client(settings.timeout_seconds)?,
            endpoint: settings.chat_endpoint.clone(),
            model: settings.model.clone(),
            api_key_env: settings.api_key_env.clone(),
        })
    }
}

impl PromptSource for ChatCompletionsSource {
    fn fetch_prompt(&self) -> Result<String, PromptError> {
        // Read on every request so a key exported after startup is picked up.
        let key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PromptError::MissingApiKey(self.api_key_env.clone()))?;
        let payload = chat_request_body(&self.model);
        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "requesting prompt");
        let body = send(
            self.client
                .post(&self.endpoint)
                .header(AUTHORIZATION, format!("Bearer {key}"))
                .header(CONTENT_TYPE, "application/json")
                .body(payload.to_string()),
        )?;
        parse_chat_completion(&body)
    }
}

pub fn chat_request_body(model: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_MESSAGE },
            { "role": "user", "content": USER_MESSAGE },
        ],
        "max_tokens": MAX_TOKENS,
    })
}

pub fn parse_proxy_response(body: &str) -> Result<String, PromptError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| PromptError::Malformed(err.to_string()))?;
    non_empty(value.get("prompt").and_then(Value::as_str))
}

/// `choices[0].message.content`, trimmed.
pub fn parse_chat_completion(body: &str) -> Result<String, PromptError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| PromptError::Malformed(err.to_string()))?;
    non_empty(value.pointer("/choices/0/message/content").and_then(Value::as_str))
}

fn non_empty(text: Option<&str>) -> Result<String, PromptError> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(PromptError::MissingPrompt)
}

pub fn build_source(settings: &PromptSettings) -> Result<Arc<dyn PromptSource>, PromptError> {
    let source: Arc<dyn PromptSource> = match settings.mode {
        PromptMode::Proxy => Arc::new(ProxyPromptSource::new(
            settings.endpoint.clone(),
            settings.timeout_seconds,
        )?),
        PromptMode::Direct => Arc::new(ChatCompletionsSource::new(settings)?),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_prompt_is_trimmed() {
        assert_eq!(
            parse_proxy_response(r#"{"prompt":"  Lighthouse \n"}"#).expect("prompt"),
            "Lighthouse"
        );
    }

    #[test]
    fn proxy_error_body_has_no_prompt() {
        assert!(matches!(
            parse_proxy_response(r#"{"error":"Something went wrong"}"#),
            Err(PromptError::MissingPrompt)
        ));
        assert!(matches!(
            parse_proxy_response(r#"{"prompt":"   "}"#),
            Err(PromptError::MissingPrompt)
        ));
        assert!(matches!(
            parse_proxy_response("<html>"),
            Err(PromptError::Malformed(_))
        ));
    }

    #[test]
    fn chat_completion_takes_first_choice() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": " Umbrella. "}},
                {"message": {"role": "assistant", "content": "Cat"}}
            ]
        }"#;
        assert_eq!(parse_chat_completion(body).expect("prompt"), "Umbrella.");
        assert!(matches!(
            parse_chat_completion(r#"{"choices": []}"#),
            Err(PromptError::MissingPrompt)
        ));
    }

    #[test]
    fn chat_request_matches_the_game_contract() {
        let body = chat_request_body("gpt-4o-mini");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 50);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_MESSAGE);
        assert_eq!(body["messages"][1]["content"], USER_MESSAGE);
    }

    #[test]
    fn missing_api_key_fails_before_any_request() {
        let settings = PromptSettings {
            mode: PromptMode::Direct,
            chat_endpoint: "http://127.0.0.1:9/unused".into(),
            api_key_env: "LAYERED_SKETCH_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..PromptSettings::default()
        };
        let source = build_source(&settings).expect("source");
        match source.fetch_prompt() {
            Err(PromptError::MissingApiKey(name)) => {
                assert_eq!(name, "LAYERED_SKETCH_TEST_KEY_THAT_IS_NEVER_SET")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
