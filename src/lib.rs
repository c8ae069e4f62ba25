pub mod config;
pub mod data_api;
pub mod error;
pub mod response;
pub mod server;
pub mod service;
pub mod summarize;
pub mod youtube;

use serde::Deserialize;

pub use error::ApiError;

/// Caption language requested from every transcript source
pub const CAPTION_LANG: &str = "en";

/// Flattened transcripts shorter than this are not worth summarizing
pub const MIN_TRANSCRIPT_CHARS: usize = 50;

/// A single caption cue; timing is discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub text: String,
}

/// Parsed caption document, cues in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptDocument {
    pub cues: Vec<Cue>,
}

impl TranscriptDocument {
    /// Join cue text with a single space and trim the ends.
    ///
    /// Whitespace inside a cue is kept, so `["Hello ", "world."]` becomes `"Hello  world."`.
    pub fn flatten(&self) -> String {
        self.cues
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Inbound body for the summarize and transcript endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub video_id: Option<String>,
    pub video_url: Option<String>,
}

impl SummarizeRequest {
    /// Build a request from CLI input: anything that parses as a URL is sent as `videoUrl`.
    pub fn from_input(input: &str) -> Self {
        let input = input.trim();
        if url::Url::parse(input).is_ok() {
            Self {
                video_id: None,
                video_url: Some(input.to_string()),
            }
        } else {
            Self {
                video_id: Some(input.to_string()),
                video_url: None,
            }
        }
    }
}

/// Resolve the canonical video ID from a request.
///
/// A non-empty `videoId` wins; otherwise the `v` query parameter of `videoUrl` is used.
pub fn resolve_video_id(request: &SummarizeRequest) -> Result<String, ApiError> {
    let direct = request.video_id.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let video_id = match direct {
        Some(id) => id.to_string(),
        None => {
            let video_url = request
                .video_url
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ApiError::InvalidRequest("Missing videoId or videoUrl in request body.".to_string()))?;
            extract_video_id(video_url)?
        }
    };

    if !regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap().is_match(&video_id) {
        return Err(ApiError::InvalidRequest(format!("Malformed video ID: {video_id}")));
    }

    Ok(video_id)
}

/// Pull the `v` query parameter out of a watch URL
pub fn extract_video_id(video_url: &str) -> Result<String, ApiError> {
    let parsed = url::Url::parse(video_url).map_err(|e| ApiError::InvalidRequest(format!("Invalid URL: {e}")))?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Could not extract video ID from URL.".to_string()))
}
