use async_trait::async_trait;
use log::{debug, warn};

use crate::{ApiError, CAPTION_LANG, Cue, MIN_TRANSCRIPT_CHARS, TranscriptDocument};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";

/// Elements whose presence marks a caption document (timedtext and TTML roots)
const CONTAINER_TAGS: [&[u8]; 3] = [b"transcript", b"body", b"tt"];

/// Elements holding one cue each
const CUE_TAGS: [&[u8]; 2] = [b"text", b"p"];

/// Something that can hand back a raw caption document for a video
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_captions(&self, video_id: &str, lang: &str) -> Result<String, ApiError>;
}

/// Unauthenticated public timedtext endpoint
pub struct TimedTextSource {
    client: reqwest::Client,
    base_url: String,
}

impl TimedTextSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TranscriptSource for TimedTextSource {
    fn name(&self) -> &'static str {
        "timedtext"
    }

    async fn fetch_captions(&self, video_id: &str, lang: &str) -> Result<String, ApiError> {
        debug!("Fetching timedtext: {} v={video_id} lang={lang}", self.base_url);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("v", video_id), ("lang", lang)])
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| ApiError::TranscriptUnavailable(format!("caption request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::TranscriptUnavailable(format!(
                "YouTube API returned status {}.",
                status.as_u16()
            )));
        }

        resp.text()
            .await
            .map_err(|e| ApiError::TranscriptUnavailable(format!("failed to read caption body: {e}")))
    }
}

/// Fetch, parse and flatten the transcript for a video.
///
/// The result is guaranteed to be at least `MIN_TRANSCRIPT_CHARS` long.
pub async fn acquire_transcript(source: &dyn TranscriptSource, video_id: &str) -> Result<String, ApiError> {
    let text = fetch_transcript(source, video_id).await?;

    let length = text.chars().count();
    if length < MIN_TRANSCRIPT_CHARS {
        warn!("Transcript for {video_id} too short: {length} chars");
        return Err(ApiError::TranscriptTooShort { length });
    }

    Ok(text)
}

/// Fetch and flatten without the minimum-length requirement
pub async fn fetch_transcript(source: &dyn TranscriptSource, video_id: &str) -> Result<String, ApiError> {
    let body = source.fetch_captions(video_id, CAPTION_LANG).await?;
    let document = parse_caption_xml(&body)?;
    debug!(
        "Parsed {} cues for {video_id} via {}",
        document.cues.len(),
        source.name()
    );
    Ok(document.flatten())
}

fn decode_text(raw: &[u8], unescaped: Option<String>) -> String {
    let text = unescaped.unwrap_or_else(|| String::from_utf8_lossy(raw).into_owned());
    html_escape::decode_html_entities(&text).into_owned()
}

/// Parse a timedtext or TTML caption document into cues.
pub fn parse_caption_xml(xml: &str) -> Result<TranscriptDocument, ApiError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut saw_container = false;
    let mut cues = Vec::new();
    let mut current: Option<String> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                if CONTAINER_TAGS.contains(&name.as_ref()) {
                    saw_container = true;
                }
                if current.is_some() {
                    depth += 1;
                } else if CUE_TAGS.contains(&name.as_ref()) {
                    current = Some(String::new());
                    depth = 0;
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.local_name();
                if CONTAINER_TAGS.contains(&name.as_ref()) {
                    saw_container = true;
                }
                match current.as_mut() {
                    // Self-closing cue: present but blank
                    None if CUE_TAGS.contains(&name.as_ref()) => cues.push(Cue { text: String::new() }),
                    Some(buf) if name.as_ref() == b"br" => buf.push(' '),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(buf) = current.as_mut() {
                    let unescaped = e.unescape().ok().map(|c| c.into_owned());
                    buf.push_str(&decode_text(e, unescaped));
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(_)) => {
                if current.is_some() {
                    if depth == 0 {
                        if let Some(text) = current.take() {
                            cues.push(Cue { text });
                        }
                    } else {
                        depth -= 1;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ApiError::TranscriptUnavailable(format!("error parsing caption XML: {e}")));
            }
            _ => {}
        }
    }

    if !saw_container {
        return Err(ApiError::TranscriptUnavailable(
            "No English captions available for this video.".to_string(),
        ));
    }
    if cues.is_empty() {
        return Err(ApiError::TranscriptEmpty);
    }

    Ok(TranscriptDocument { cues })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(Result<&'static str, u16>);

    #[async_trait]
    impl TranscriptSource for StaticSource {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch_captions(&self, _video_id: &str, lang: &str) -> Result<String, ApiError> {
            assert_eq!(lang, "en");
            match self.0 {
                Ok(body) => Ok(body.to_string()),
                Err(code) => Err(ApiError::TranscriptUnavailable(format!(
                    "YouTube API returned status {code}."
                ))),
            }
        }
    }

    const LONG_XML: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
    <text start="0.21" dur="2.34">Welcome back to the channel, today we are</text>
    <text start="2.55" dur="1.50">looking at how caption documents get parsed.</text>
</transcript>"#;

    #[test]
    fn test_parse_caption_xml_basic() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
    <text start="0.21" dur="2.34">Hello world</text>
    <text start="2.55" dur="1.50">This is a test</text>
</transcript>"#;

        let doc = parse_caption_xml(xml).unwrap();
        assert_eq!(doc.cues.len(), 2);
        assert_eq!(doc.cues[0].text, "Hello world");
        assert_eq!(doc.cues[1].text, "This is a test");
        assert_eq!(doc.flatten(), "Hello world This is a test");
    }

    #[test]
    fn test_parse_preserves_cue_whitespace() {
        let xml = r#"<transcript><text start="0" dur="1">Hello </text><text start="1" dur="1">world.</text></transcript>"#;
        let doc = parse_caption_xml(xml).unwrap();
        assert_eq!(doc.flatten(), "Hello  world.");
    }

    #[test]
    fn test_parse_caption_xml_html_entities() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
    <text start="0.0" dur="1.0">it&amp;#39;s a &amp;quot;test&amp;quot;</text>
</transcript>"#;

        let doc = parse_caption_xml(xml).unwrap();
        assert_eq!(doc.cues.len(), 1);
        assert_eq!(doc.cues[0].text, "it's a \"test\"");
    }

    #[test]
    fn test_parse_ttml_with_spans() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<tt xmlns="http://www.w3.org/ns/ttml"><body><div>
<p begin="00:00:00.000" end="00:00:01.000">first <span>cue</span></p>
<p begin="00:00:01.000" end="00:00:02.000">second</p>
</div></body></tt>"#;

        let doc = parse_caption_xml(xml).unwrap();
        assert_eq!(doc.cues.len(), 2);
        assert_eq!(doc.cues[0].text, "first cue");
        assert_eq!(doc.cues[1].text, "second");
    }

    #[test]
    fn test_parse_ttml_line_break_separates_words() {
        let xml = r#"<tt xmlns="http://www.w3.org/ns/ttml"><body><div>
<p begin="00:00:00.000" end="00:00:01.000">first line<br/>second line</p>
</div></body></tt>"#;

        let doc = parse_caption_xml(xml).unwrap();
        assert_eq!(doc.cues.len(), 1);
        assert_eq!(doc.flatten(), "first line second line");
    }

    #[test]
    fn test_parse_caption_xml_empty() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript></transcript>"#;
        assert!(matches!(parse_caption_xml(xml), Err(ApiError::TranscriptEmpty)));
    }

    #[test]
    fn test_parse_no_markers_is_unavailable() {
        assert!(matches!(parse_caption_xml(""), Err(ApiError::TranscriptUnavailable(_))));
        assert!(matches!(
            parse_caption_xml("<error>nope</error>"),
            Err(ApiError::TranscriptUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_malformed_is_unavailable() {
        let err = parse_caption_xml("<transcript><text>oops</transcript>").unwrap_err();
        assert!(matches!(err, ApiError::TranscriptUnavailable(_)));
    }

    #[test]
    fn test_self_closing_cue_counts() {
        let doc = parse_caption_xml(r#"<transcript><text start="0" dur="1"/></transcript>"#).unwrap();
        assert_eq!(doc.cues.len(), 1);
        assert_eq!(doc.flatten(), "");
    }

    #[tokio::test]
    async fn test_acquire_transcript_ok() {
        let text = acquire_transcript(&StaticSource(Ok(LONG_XML)), "abc123").await.unwrap();
        assert!(text.starts_with("Welcome back"));
        assert!(text.chars().count() >= MIN_TRANSCRIPT_CHARS);
    }

    #[tokio::test]
    async fn test_acquire_transcript_too_short() {
        let xml = r#"<transcript><text start="0" dur="1">Hello </text><text start="1" dur="1">world.</text></transcript>"#;
        let err = acquire_transcript(&StaticSource(Ok(xml)), "abc123").await.unwrap_err();
        assert!(matches!(err, ApiError::TranscriptTooShort { length: 13 }));
    }

    #[tokio::test]
    async fn test_acquire_transcript_transport_failure() {
        let err = acquire_transcript(&StaticSource(Err(404)), "abc123").await.unwrap_err();
        assert!(matches!(err, ApiError::TranscriptUnavailable(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_fetch_transcript_skips_length_check() {
        let xml = r#"<transcript><text start="0" dur="1">short</text></transcript>"#;
        assert_eq!(fetch_transcript(&StaticSource(Ok(xml)), "abc123").await.unwrap(), "short");
    }
}
