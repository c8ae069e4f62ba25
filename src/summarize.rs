use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;

use crate::ApiError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

const SYSTEM_PROMPT: &str = "You are a professional summarization AI.";

/// Produces a natural-language summary of a flattened transcript
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str) -> Result<String, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    /// Pick the provider a model name belongs to
    pub fn for_model(model: &str) -> Self {
        if model.starts_with("claude") {
            Provider::Anthropic
        } else {
            Provider::OpenAi
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "OpenAI"),
            Provider::Anthropic => write!(f, "Anthropic"),
        }
    }
}

/// Chat-completion summarizer for OpenAI or Anthropic
pub struct ChatSummarizer {
    client: reqwest::Client,
    provider: Provider,
    api_key: String,
    model: String,
    temperature: f64,
    base_url: String,
}

impl ChatSummarizer {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
        base_url: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            client,
            provider: Provider::for_model(&model),
            api_key: api_key.into(),
            model,
            temperature,
            base_url: base_url.into(),
        }
    }

    async fn request(&self, transcript: &str) -> Result<String> {
        debug!(
            "Summarizing {} chars via {} with model {}",
            transcript.len(),
            self.provider,
            self.model
        );

        match self.provider {
            Provider::Anthropic => self.request_anthropic(transcript).await,
            Provider::OpenAi => self.request_openai(transcript).await,
        }
    }

    async fn request_anthropic(&self, transcript: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 1024,
            "temperature": self.temperature,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": user_prompt(transcript)
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Anthropic API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_anthropic_text(&json)
    }

    async fn request_openai(&self, transcript: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": user_prompt(transcript)
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("OpenAI API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_openai_text(&json)
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String, ApiError> {
        self.request(transcript)
            .await
            .map_err(|e| ApiError::SummarizationFailed(format!("{e:#}")))
    }
}

fn user_prompt(transcript: &str) -> String {
    format!(
        "Summarize the following YouTube video transcript concisely and clearly in two short paragraphs. \
Transcript: \n\n{transcript}"
    )
}

// Empty text passes through; only a missing text block is an error.
fn extract_anthropic_text(json: &serde_json::Value) -> Result<String> {
    if let Some(content) = json.get("content").and_then(|c| c.as_array()) {
        let blocks: Vec<&str> = content
            .iter()
            .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|block| block.get("text")?.as_str())
            .collect();
        if !blocks.is_empty() {
            return Ok(blocks.concat());
        }
    }
    bail!("unexpected Anthropic API response format");
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String> {
    if let Some(text) = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
    {
        return Ok(text.to_string());
    }
    bail!("unexpected OpenAI API response format");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_for_model() {
        assert_eq!(Provider::for_model("claude-sonnet-4-6"), Provider::Anthropic);
        assert_eq!(Provider::for_model("claude-3-opus-20240229"), Provider::Anthropic);
        assert_eq!(Provider::for_model("gpt-4o"), Provider::OpenAi);
        assert_eq!(Provider::for_model("gpt-4o-mini"), Provider::OpenAi);
    }

    #[test]
    fn test_user_prompt_contains_transcript() {
        let prompt = user_prompt("the words");
        assert!(prompt.starts_with("Summarize the following YouTube video transcript"));
        assert!(prompt.ends_with("\n\nthe words"));
    }

    #[test]
    fn test_extract_anthropic_text() {
        let json = serde_json::json!({
            "content": [
                {
                    "type": "text",
                    "text": "Here is the summary."
                }
            ]
        });
        assert_eq!(extract_anthropic_text(&json).unwrap(), "Here is the summary.");
    }

    #[test]
    fn test_extract_anthropic_text_missing() {
        let json = serde_json::json!({"content": []});
        assert!(extract_anthropic_text(&json).is_err());
    }

    #[test]
    fn test_extract_anthropic_text_blank_passes_through() {
        let json = serde_json::json!({"content": [{"type": "text", "text": ""}]});
        assert_eq!(extract_anthropic_text(&json).unwrap(), "");
    }

    #[test]
    fn test_extract_openai_text() {
        let json = serde_json::json!({
            "choices": [
                {
                    "message": {
                        "role": "assistant",
                        "content": "Summary of the video."
                    }
                }
            ]
        });
        assert_eq!(extract_openai_text(&json).unwrap(), "Summary of the video.");
    }

    #[test]
    fn test_extract_openai_text_empty_content() {
        let json = serde_json::json!({"choices": [{"message": {"content": ""}}]});
        assert_eq!(extract_openai_text(&json).unwrap(), "");
    }

    #[test]
    fn test_extract_openai_text_no_choices() {
        let json = serde_json::json!({"choices": []});
        assert!(extract_openai_text(&json).is_err());
    }
}
