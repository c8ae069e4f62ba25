use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::ApiError;
use crate::config::GoogleCredentials;
use crate::youtube::TranscriptSource;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CaptionList {
    #[serde(default)]
    items: Vec<CaptionItem>,
}

#[derive(Debug, Deserialize)]
struct CaptionItem {
    id: String,
    snippet: Option<CaptionSnippet>,
}

#[derive(Debug, Deserialize)]
struct CaptionSnippet {
    language: Option<String>,
}

/// YouTube Data API v3 captions, authenticated with an OAuth refresh token
pub struct DataApiSource {
    client: reqwest::Client,
    credentials: GoogleCredentials,
    api_base: String,
    token_url: String,
}

impl DataApiSource {
    pub fn new(client: reqwest::Client, credentials: GoogleCredentials) -> Self {
        Self {
            client,
            credentials,
            api_base: DEFAULT_API_BASE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_endpoints(mut self, api_base: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.token_url = token_url.into();
        self
    }

    async fn access_token(&self) -> Result<String, ApiError> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let resp = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ApiError::TranscriptUnavailable(format!("OAuth token request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ApiError::TranscriptUnavailable(format!(
                "OAuth token exchange returned status {}.",
                resp.status().as_u16()
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::TranscriptUnavailable(format!("malformed OAuth token response: {e}")))?;
        Ok(token.access_token)
    }

    async fn get(&self, url: &str, token: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::TranscriptUnavailable(format!("captions request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::TranscriptUnavailable(format!(
                "YouTube Data API returned status {}.",
                status.as_u16()
            )));
        }
        Ok(resp)
    }
}

/// First track in the requested language; other languages are never used
fn pick_track<'a>(items: &'a [CaptionItem], lang: &str) -> Option<&'a CaptionItem> {
    items
        .iter()
        .find(|item| {
            item.snippet
                .as_ref()
                .and_then(|s| s.language.as_deref())
                .is_some_and(|l| l.starts_with(lang))
        })
}

#[async_trait]
impl TranscriptSource for DataApiSource {
    fn name(&self) -> &'static str {
        "data-api"
    }

    async fn fetch_captions(&self, video_id: &str, lang: &str) -> Result<String, ApiError> {
        let token = self.access_token().await?;

        let list_url = format!("{}/captions", self.api_base);
        let list: CaptionList = self
            .get(&list_url, &token, &[("part", "id,snippet"), ("videoId", video_id)])
            .await?
            .json()
            .await
            .map_err(|e| ApiError::TranscriptUnavailable(format!("malformed captions list: {e}")))?;

        let track = pick_track(&list.items, lang).ok_or_else(|| {
            ApiError::TranscriptUnavailable("No captions found or captions require authentication.".to_string())
        })?;
        debug!("Using caption track {} for {video_id}", track.id);

        let download_url = format!("{}/captions/{}", self.api_base, track.id);
        self.get(&download_url, &token, &[("tfmt", "ttml")])
            .await?
            .text()
            .await
            .map_err(|e| ApiError::TranscriptUnavailable(format!("failed to read caption body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, lang: Option<&str>) -> CaptionItem {
        CaptionItem {
            id: id.to_string(),
            snippet: Some(CaptionSnippet {
                language: lang.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_pick_track_prefers_language() {
        let items = vec![item("fr1", Some("fr")), item("en1", Some("en-GB"))];
        assert_eq!(pick_track(&items, "en").unwrap().id, "en1");
    }

    #[test]
    fn test_pick_track_ignores_other_languages() {
        let items = vec![item("de1", Some("de")), item("x", None)];
        assert!(pick_track(&items, "en").is_none());
    }

    #[test]
    fn test_pick_track_empty() {
        assert!(pick_track(&[], "en").is_none());
    }

    #[test]
    fn test_parse_caption_list() {
        let json = r#"{"kind":"youtube#captionListResponse","items":[{"id":"AUieDa","snippet":{"language":"en","trackKind":"standard"}}]}"#;
        let list: CaptionList = serde_json::from_str(json).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].id, "AUieDa");
    }

    #[test]
    fn test_parse_caption_list_without_items() {
        let list: CaptionList = serde_json::from_str(r#"{"kind":"youtube#captionListResponse"}"#).unwrap();
        assert!(list.items.is_empty());
    }
}
