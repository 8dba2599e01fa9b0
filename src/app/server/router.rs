use crate::{app::state::AppState, error::MedibotError};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::time::Duration;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::Span;

/// The chat UI, embedded so `GET /` never depends on anything external.
const CHAT_PAGE: &str = include_str!("../../../assets/chat.html");

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(chat_page))
        .route("/get", post(message))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .on_request(|req: &axum::http::Request<_>, _span: &Span| {
                    tracing::info!("Processing request | {} {}", req.method(), req.uri());
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                        tracing::info!(
                            "Sending response | {} | {}ms",
                            res.status(),
                            latency.as_millis()
                        );
                    },
                )
                .on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        tracing::error!("Error in request: {error}")
                    },
                ),
        )
        // Has to go last to exclude the tracing layer
        .route("/_health", get(health_check))
}

async fn health_check() -> impl IntoResponse {
    "OK"
}

async fn chat_page() -> impl IntoResponse {
    Html(CHAT_PAGE)
}

#[derive(Debug, Deserialize)]
struct MessageParams {
    /// The user's chat message.
    #[serde(default)]
    msg: String,
}

async fn message(
    state: State<AppState>,
    Form(params): Form<MessageParams>,
) -> Result<String, MedibotError> {
    state.services.chat.answer(&params.msg).await
}
