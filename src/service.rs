use std::sync::Arc;

use actix_web::http::Method;
use log::{debug, info, warn};

use crate::config::{Config, SourceKind};
use crate::data_api::{DEFAULT_API_BASE, DEFAULT_TOKEN_URL, DataApiSource};
use crate::summarize::{
    ChatSummarizer, DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_TEMPERATURE, Provider,
    Summarizer,
};
use crate::youtube::{self, DEFAULT_TIMEDTEXT_URL, TimedTextSource, TranscriptSource};
use crate::{ApiError, SummarizeRequest, resolve_video_id};

/// Successful terminal outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Preflight,
    Summary(String),
    Transcript { video_id: String, text: String },
}

/// Stateless summarization pipeline: validate, fetch transcript, summarize.
///
/// Each collaborator is either present or carries the reason it could not be configured.
pub struct SummaryService {
    source: Result<Arc<dyn TranscriptSource>, String>,
    summarizer: Result<Arc<dyn Summarizer>, String>,
}

impl SummaryService {
    pub fn new(source: Arc<dyn TranscriptSource>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            source: Ok(source),
            summarizer: Ok(summarizer),
        }
    }

    /// Service whose summarizer is missing; every summarize call fails with `ServerMisconfigured`.
    pub fn without_summarizer(source: Arc<dyn TranscriptSource>, reason: impl Into<String>) -> Self {
        Self {
            source: Ok(source),
            summarizer: Err(reason.into()),
        }
    }

    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let source: Result<Arc<dyn TranscriptSource>, String> = match config.transcript_source.unwrap_or_default() {
            SourceKind::Timedtext => {
                let url = config.timedtext_url.as_deref().unwrap_or(DEFAULT_TIMEDTEXT_URL);
                Ok(Arc::new(TimedTextSource::new(client.clone(), url)))
            }
            SourceKind::DataApi => match config.google.as_ref().filter(|g| g.is_complete()) {
                Some(creds) => Ok(Arc::new(DataApiSource::new(client.clone(), creds.clone()).with_endpoints(
                    config.google_api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
                    config.google_token_url.as_deref().unwrap_or(DEFAULT_TOKEN_URL),
                ))),
                None => Err("Google OAuth credentials are missing.".to_string()),
            },
        };

        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let temperature = config.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        let provider = Provider::for_model(model);
        let (key, base_url) = match provider {
            Provider::OpenAi => (
                config.openai_api_key.as_deref(),
                config.openai_base_url.as_deref().unwrap_or(DEFAULT_OPENAI_BASE_URL),
            ),
            Provider::Anthropic => (
                config.anthropic_api_key.as_deref(),
                config.anthropic_base_url.as_deref().unwrap_or(DEFAULT_ANTHROPIC_BASE_URL),
            ),
        };
        let summarizer: Result<Arc<dyn Summarizer>, String> = match key.filter(|k| !k.is_empty()) {
            Some(key) => Ok(Arc::new(ChatSummarizer::new(client, key, model, temperature, base_url))),
            None => Err(format!("{provider} API Key is missing.")),
        };

        if let Err(reason) = &source {
            warn!("Transcript source not configured: {reason}");
        }
        if let Err(reason) = &summarizer {
            warn!("Summarizer not configured: {reason}");
        }

        Self { source, summarizer }
    }

    fn source(&self) -> Result<&dyn TranscriptSource, ApiError> {
        self.source
            .as_deref()
            .map_err(|reason| ApiError::ServerMisconfigured(reason.clone()))
    }

    fn summarizer(&self) -> Result<&dyn Summarizer, ApiError> {
        self.summarizer
            .as_deref()
            .map_err(|reason| ApiError::ServerMisconfigured(reason.clone()))
    }

    /// Handle one request to the summarize endpoint
    pub async fn handle_summarize(&self, method: &Method, body: &[u8]) -> Result<Reply, ApiError> {
        if let Some(reply) = check_method(method)? {
            return Ok(reply);
        }

        // Configuration is checked before the body so nothing goes out on the wire.
        self.summarizer()?;
        self.source()?;

        let request = parse_body(body)?;
        self.summarize(&request).await.map(Reply::Summary)
    }

    /// Handle one request to the transcript endpoint
    pub async fn handle_transcript(&self, method: &Method, body: &[u8]) -> Result<Reply, ApiError> {
        if let Some(reply) = check_method(method)? {
            return Ok(reply);
        }
        self.source()?;

        let request = parse_body(body)?;
        let video_id = resolve_video_id(&request)?;
        let text = self.transcript(&video_id).await?;
        Ok(Reply::Transcript { video_id, text })
    }

    /// Flattened transcript for a resolved video ID, without the length requirement
    pub async fn transcript(&self, video_id: &str) -> Result<String, ApiError> {
        let source = self.source()?;
        debug!("Fetching transcript for {video_id} via {}", source.name());
        youtube::fetch_transcript(source, video_id).await
    }

    /// Run validation, transcript acquisition and summarization for one request.
    pub async fn summarize(&self, request: &SummarizeRequest) -> Result<String, ApiError> {
        let summarizer = self.summarizer()?;
        let source = self.source()?;

        let video_id = resolve_video_id(request)?;
        info!("Summarizing video {video_id} via {}", source.name());

        let transcript = youtube::acquire_transcript(source, &video_id)
            .await
            .inspect_err(|e| warn!("Transcript for {video_id} failed ({}): {e}", e.kind()))?;
        debug!("Transcript for {video_id}: {} chars", transcript.chars().count());

        let summary = summarizer
            .summarize(&transcript)
            .await
            .inspect_err(|e| warn!("Summarization for {video_id} failed: {e}"))?;
        info!("Summary for {video_id}: {} chars", summary.chars().count());
        Ok(summary)
    }
}

/// `Some(Preflight)` for OPTIONS, `None` for POST, an error otherwise
fn check_method(method: &Method) -> Result<Option<Reply>, ApiError> {
    if *method == Method::OPTIONS {
        Ok(Some(Reply::Preflight))
    } else if *method == Method::POST {
        Ok(None)
    } else {
        Err(ApiError::MethodNotAllowed)
    }
}

fn parse_body(body: &[u8]) -> Result<SummarizeRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidRequest(format!("Malformed JSON body: {e}")))
}
