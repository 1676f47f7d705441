//! Fix Requester
//!
//! Composes the two-message prompt for a diagnostic, issues one chat
//! completion request, and extracts the replacement code from the first
//! choice of the response. No retries, no streaming, no local timeout.

use crate::config::FixSettings;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Fixed sampling temperature for fix requests.
pub const FIX_TEMPERATURE: f32 = 0.5;

/// Exact response content the model is instructed to use when it gives up.
pub const NO_FIX_SENTINEL: &str = "I can't fix this problem";

#[derive(Error, Debug)]
pub enum FixError {
    #[error("API key is not set. Please set it in the extension settings.")]
    MissingApiKey,
    #[error("Request to the completion endpoint failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Completion endpoint returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("GPT AI was unable to provide a suitable fix.")]
    NoUsableFix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// The single outbound network seam. Production uses [`OpenAiClient`]; tests
/// stub this trait instead of the HTTP layer.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, api_key: &str, request: &ChatRequest)
        -> Result<ChatResponse, FixError>;
}

pub struct OpenAiClient {
    client: reqwest::Client,
    api_base: String,
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self::with_api_base(OPENAI_API_BASE)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, FixError> {
        let url = format!("{}/chat/completions", self.api_base);
        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(FixError::Api { status, body });
        }

        Ok(res.json().await?)
    }
}

/// Whether `model` reliably honors a dedicated system message. Models outside
/// this policy get the instruction folded into the leading user message
/// instead, per OpenAI's guidance for gpt-3.5-turbo.
pub fn supports_system_role(model: &str) -> bool {
    model.starts_with("gpt-4")
}

/// The two ordered prompt messages: the instruction, then the diagnostic and
/// its surrounding code wrapped in the configurable template fragments.
pub fn build_messages(settings: &FixSettings, problem: &str, problem_code: &str) -> Vec<ChatMessage> {
    let instruction_role = if supports_system_role(&settings.model) {
        "system"
    } else {
        "user"
    };

    vec![
        ChatMessage::new(instruction_role, settings.system_prompt.clone()),
        ChatMessage::new(
            "user",
            format!(
                "{}{}{}{}{}",
                settings.problem_prefix,
                problem,
                settings.problem_code_prefix,
                problem_code,
                settings.prompt_suffix
            ),
        ),
    ]
}

/// Strip a single pair of Markdown code fences wrapping the whole solution.
/// Applies only when the text contains exactly two fence markers; any other
/// count (0, 1, 3+) passes through unmodified.
pub fn strip_code_fences(solution: &str) -> String {
    if solution.matches("```").count() != 2 {
        return solution.to_string();
    }
    let (Ok(opening), Ok(closing)) = (Regex::new(r"^```\s*"), Regex::new(r"\s*```$")) else {
        return solution.to_string();
    };
    let stripped = opening.replace(solution, "");
    closing.replace(&stripped, "").into_owned()
}

/// Request a replacement for `problem` given its surrounding `problem_code`.
///
/// Failures surface as typed errors and the caller aborts the edit; an empty
/// or sentinel response is `NoUsableFix`, never an empty replacement string.
pub async fn request_fix(
    client: &dyn ChatClient,
    settings: &FixSettings,
    problem: &str,
    problem_code: &str,
) -> Result<String, FixError> {
    // Callers gate on the credential already; re-checked here so the request
    // can never go out unauthenticated.
    if settings.missing_api_key() {
        return Err(FixError::MissingApiKey);
    }

    let request = ChatRequest {
        model: settings.model.clone(),
        messages: build_messages(settings, problem, problem_code),
        temperature: FIX_TEMPERATURE,
    };

    let response = client.complete(&settings.api_key, &request).await?;

    let solution = response
        .choices
        .first()
        .map(|choice| choice.message.content.clone())
        .unwrap_or_default();

    if solution.is_empty() || solution == NO_FIX_SENTINEL {
        return Err(FixError::NoUsableFix);
    }

    Ok(strip_code_fences(&solution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubClient {
        content: Option<String>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl StubClient {
        fn replying(content: &str) -> Self {
            Self {
                content: Some(content.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self {
                content: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for StubClient {
        async fn complete(
            &self,
            _api_key: &str,
            request: &ChatRequest,
        ) -> Result<ChatResponse, FixError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(ChatResponse {
                choices: self
                    .content
                    .iter()
                    .map(|content| ChatChoice {
                        message: ChatMessage::new("assistant", content.clone()),
                    })
                    .collect(),
            })
        }
    }

    fn settings_with_key(model: &str) -> FixSettings {
        let mut settings = FixSettings::default();
        settings.api_key = "test-dummy-api-key".to_string();
        settings.model = model.to_string();
        settings
    }

    #[test]
    fn test_system_role_policy() {
        assert!(supports_system_role("gpt-4"));
        assert!(supports_system_role("gpt-4-turbo"));
        assert!(!supports_system_role("gpt-3.5-turbo"));
    }

    #[test]
    fn test_build_messages_system_role_for_gpt4() {
        let settings = settings_with_key("gpt-4");
        let messages = build_messages(&settings, "Sample Error", "let x = 1;");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, settings.system_prompt);
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn test_build_messages_folds_instruction_for_turbo() {
        let settings = settings_with_key("gpt-3.5-turbo");
        let messages = build_messages(&settings, "Sample Error", "let x = 1;");
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_user_message_concatenation_order() {
        let mut settings = settings_with_key("gpt-3.5-turbo");
        settings.problem_prefix = "A".to_string();
        settings.problem_code_prefix = "B".to_string();
        settings.prompt_suffix = "C".to_string();
        let messages = build_messages(&settings, "err", "code");
        assert_eq!(messages[1].content, "AerrBcodeC");
    }

    #[test]
    fn test_request_body_wire_shape() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![ChatMessage::new("user", "hi")],
            temperature: FIX_TEMPERATURE,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_strip_fences_exactly_one_pair() {
        assert_eq!(
            strip_code_fences("```\nfn main() {}\n```"),
            "fn main() {}"
        );
    }

    #[test]
    fn test_strip_fences_other_counts_untouched() {
        assert_eq!(strip_code_fences("no fences here"), "no fences here");
        assert_eq!(strip_code_fences("```\nunterminated"), "```\nunterminated");
        let three = "```\na\n```\nb\n```";
        assert_eq!(strip_code_fences(three), three);
    }

    #[tokio::test]
    async fn test_request_fix_returns_solution() {
        let client = StubClient::replying("function fixedTest() {}");
        let settings = settings_with_key("gpt-3.5-turbo");
        let fix = request_fix(&client, &settings, "Sample Error", "function test() {}")
            .await
            .unwrap();
        assert_eq!(fix, "function fixedTest() {}");
    }

    #[tokio::test]
    async fn test_request_fix_strips_fenced_solution() {
        let client = StubClient::replying("```\nfunction fixedTest() {}\n```");
        let settings = settings_with_key("gpt-3.5-turbo");
        let fix = request_fix(&client, &settings, "Sample Error", "function test() {}")
            .await
            .unwrap();
        assert_eq!(fix, "function fixedTest() {}");
    }

    #[tokio::test]
    async fn test_request_fix_sends_fixed_temperature() {
        let client = StubClient::replying("ok");
        let settings = settings_with_key("gpt-3.5-turbo");
        request_fix(&client, &settings, "err", "code").await.unwrap();
        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].temperature, 0.5);
        assert_eq!(seen[0].model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_request_fix_sentinel_is_no_usable_fix() {
        let client = StubClient::replying(NO_FIX_SENTINEL);
        let settings = settings_with_key("gpt-3.5-turbo");
        let err = request_fix(&client, &settings, "err", "code")
            .await
            .unwrap_err();
        assert!(matches!(err, FixError::NoUsableFix));
    }

    #[tokio::test]
    async fn test_request_fix_no_choices_is_no_usable_fix() {
        let client = StubClient::empty();
        let settings = settings_with_key("gpt-3.5-turbo");
        let err = request_fix(&client, &settings, "err", "code")
            .await
            .unwrap_err();
        assert!(matches!(err, FixError::NoUsableFix));
    }

    #[tokio::test]
    async fn test_request_fix_rejects_missing_api_key() {
        let client = StubClient::replying("ok");
        let settings = FixSettings::default();
        let err = request_fix(&client, &settings, "err", "code")
            .await
            .unwrap_err();
        assert!(matches!(err, FixError::MissingApiKey));
        assert!(client.seen.lock().unwrap().is_empty());
    }
}
