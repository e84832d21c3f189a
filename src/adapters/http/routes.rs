//! Ingestion routes. `POST /copy` and `POST /msg`, form field `content`.
//!
//! The sender is a best-effort phone companion with no retries, so every
//! request gets `200 success`: unreadable bodies become empty content and
//! dispatch failures are only logged.

use crate::domain::{IncomingMessage, Route};
use crate::usecases::DispatchService;
use axum::Router;
use axum::extract::{Form, FromRequest, Query, Request, State};
use axum::routing::post;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

/// Fixed response body for both routes.
pub const SUCCESS_BODY: &str = "success";

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<DispatchService>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentForm {
    #[serde(default)]
    content: Option<String>,
}

pub fn build_router(dispatcher: Arc<DispatchService>) -> Router {
    Router::new()
        .route(Route::Copy.path(), post(copy))
        .route(Route::Plain.path(), post(msg))
        .with_state(AppState { dispatcher })
}

async fn copy(State(state): State<AppState>, request: Request) -> &'static str {
    ingest(&state, Route::Copy, request).await
}

async fn msg(State(state): State<AppState>, request: Request) -> &'static str {
    ingest(&state, Route::Plain, request).await
}

async fn ingest(state: &AppState, route: Route, request: Request) -> &'static str {
    let content = read_content(request).await;
    let message = IncomingMessage::new(route, content);
    // Dispatch runs on its own task: if the client hangs up, the handler
    // future is dropped but a started clipboard/paste sequence still finishes.
    let dispatcher = Arc::clone(&state.dispatcher);
    let task = tokio::spawn(async move { dispatcher.dispatch(&message).await });
    match task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(route = %route, error = %e, "dispatch finished with failures"),
        Err(e) => error!(route = %route, error = %e, "dispatch task failed"),
    }
    SUCCESS_BODY
}

/// Form body field wins over the query string; anything unreadable is empty.
async fn read_content(request: Request) -> String {
    let from_query = Query::<ContentForm>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(form)| form.content);
    let from_body = match Form::<ContentForm>::from_request(request, &()).await {
        Ok(Form(form)) => form.content,
        Err(rejection) => {
            debug!(error = %rejection, "form body not readable; treating as empty");
            None
        }
    };
    from_body.or(from_query).unwrap_or_default()
}
