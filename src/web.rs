use crate::{card::generate_card, config::Config};
use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc};
use tokio::signal;

const PAGE: &str = include_str!("./page.html");

#[derive(Clone)]
struct SharedState {
    config: Arc<Config>,
}

/// Body of a card request, form-encoded or JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardRequest {
    #[serde(default)]
    pub url: String,
}

// An unreadable body is the same as a missing url: the handler answers with
// the validation message instead of a bare 4xx.
#[async_trait]
impl<S> FromRequest<S> for CardRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(false);

        let parsed = if is_json {
            Json::<CardRequest>::from_request(req, state)
                .await
                .map(|Json(payload)| payload)
                .map_err(|err| err.body_text())
        } else {
            Form::<CardRequest>::from_request(req, state)
                .await
                .map(|Form(payload)| payload)
                .map_err(|err| err.body_text())
        };

        Ok(parsed.unwrap_or_else(|err| {
            log::debug!("unreadable card request: {err}");
            CardRequest::default()
        }))
    }
}

/// `application/json` or any `application/*+json`, ignoring case and parameters.
fn is_json_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Programmatic calls mark themselves with `X-Requested-With: XMLHttpRequest`.
pub fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("xmlhttprequest"))
        .unwrap_or(false)
}

async fn page() -> Html<&'static str> {
    Html(PAGE)
}

async fn submit(
    State(state): State<Arc<SharedState>>,
    headers: HeaderMap,
    payload: CardRequest,
) -> Response {
    if !is_ajax(&headers) {
        return Html(PAGE).into_response();
    }

    log::debug!("payload: {payload:?}");

    let config = state.config.clone();

    let envelope = tokio::task::block_in_place(move || generate_card(&config, &payload.url));

    Json(envelope).into_response()
}

pub fn router(config: Arc<Config>) -> Router {
    let shared_state = Arc::new(SharedState { config });

    Router::new()
        .route("/", get(page).post(submit))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down");
}

async fn start_app(config: Config) -> anyhow::Result<()> {
    let listen = config.listen.clone();
    let app = router(Arc::new(config));

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    log::info!("listening on {listen}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn start_daemon(config: Config) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start_app(config))
}
