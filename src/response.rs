use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError, http::StatusCode};
use serde::Serialize;

use crate::ApiError;

/// Headers attached to every response from the summarize and transcript routes
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Content-Type", "application/json"),
];

#[derive(Serialize)]
struct SummaryBody<'a> {
    summary: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptBody<'a> {
    video_id: &'a str,
    transcript: &'a str,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

fn build(status: StatusCode) -> HttpResponseBuilder {
    let mut builder = HttpResponse::build(status);
    for header in CORS_HEADERS {
        builder.insert_header(header);
    }
    builder
}

fn json<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    match serde_json::to_string(body) {
        Ok(payload) => build(status).body(payload),
        Err(e) => build(StatusCode::INTERNAL_SERVER_ERROR).body(format!(r#"{{"error":"serialization failed: {e}"}}"#)),
    }
}

pub fn preflight() -> HttpResponse {
    json(
        StatusCode::OK,
        &MessageBody {
            message: "CORS preflight successful",
        },
    )
}

pub fn summary(text: &str) -> HttpResponse {
    json(StatusCode::OK, &SummaryBody { summary: text })
}

pub fn transcript(video_id: &str, text: &str) -> HttpResponse {
    json(
        StatusCode::OK,
        &TranscriptBody {
            video_id,
            transcript: text,
        },
    )
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        json(self.status(), &self.body())
    }
}
