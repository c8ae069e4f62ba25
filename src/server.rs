use actix_web::{App, HttpRequest, HttpResponse, HttpServer, middleware::Logger, web};
use eyre::{Result, WrapErr};
use log::info;

use crate::ApiError;
use crate::response;
use crate::service::{Reply, SummaryService};

pub struct AppState {
    pub service: SummaryService,
}

/// Routes for the summarize/transcript endpoints.
///
/// The API routes accept any method so that a 405 still carries the CORS headers.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/summarize", web::route().to(summarize))
        .route("/summarize", web::route().to(summarize))
        .route("/api/transcript", web::route().to(transcript));
}

fn render(reply: Reply) -> HttpResponse {
    match reply {
        Reply::Preflight => response::preflight(),
        Reply::Summary(text) => response::summary(&text),
        Reply::Transcript { video_id, text } => response::transcript(&video_id, &text),
    }
}

async fn summarize(req: HttpRequest, body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    state.service.handle_summarize(req.method(), &body).await.map(render)
}

async fn transcript(req: HttpRequest, body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    state.service.handle_transcript(req.method(), &body).await.map(render)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn run(state: AppState, bind: &str, port: u16) -> Result<()> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(app_config)
    })
    .bind((bind, port))
    .wrap_err_with(|| format!("failed to bind {bind}:{port}"))?
    .run();

    info!("Listening on http://{bind}:{port}");
    server.await?;
    Ok(())
}
