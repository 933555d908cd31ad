use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        Html, Redirect,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use crate::record::{UrlId, UrlRecord};
use crate::server::AppState;
use crate::service::UrlOperations;
use crate::storage::DbStats;
use crate::view::{self, UrlForm};
use crate::{Error, Result};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Deserialize)]
pub struct AddParams {
    #[serde(default)]
    pub url: String,
}

#[derive(Deserialize)]
pub struct AddRequest {
    pub url: String,
}

#[derive(Serialize)]
pub struct AddResponse {
    pub id: UrlId,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiResult<T> = std::result::Result<T, (StatusCode, Json<ErrorResponse>)>;

fn api_error(e: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        Error::UrlNotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidId(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Request failed: {}", e);
    }
    (status, Json(ErrorResponse { error: e.to_string() }))
}

// ========== Page ==========

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    // A failed initial load leaves the list in its loading state; the live
    // feed fills it in once the store answers.
    let urls = match state.service.list() {
        Ok(urls) => Some(urls),
        Err(e) => {
            tracing::error!("Failed to load URLs: {}", e);
            None
        }
    };
    Html(view::render_page(urls.as_deref()))
}

/// Live list fragment for the page: each event is the re-rendered list region
pub async fn live_fragment(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    live_events(&state, |urls| {
        Ok(Event::default()
            .event("urls")
            .data(view::render_list(Some(urls))))
    })
}

pub async fn form_add(
    State(state): State<Arc<AppState>>,
    Form(params): Form<AddParams>,
) -> Redirect {
    let mut form = UrlForm::new();
    form.set_input(params.url);
    form.submit(&state.service);
    Redirect::to("/")
}

pub async fn form_delete(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Redirect {
    match UrlId::parse(&id) {
        Ok(id) => {
            view::delete_record(&state.service, &id);
        }
        Err(e) => tracing::error!("Error deleting URL: {}", e),
    }
    Redirect::to("/")
}

// ========== JSON API ==========

pub async fn list_urls(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<UrlRecord>>> {
    state.service.list().map(Json).map_err(api_error)
}

pub async fn add_url(
    State(state): State<Arc<AppState>>,
    Json(params): Json<AddRequest>,
) -> ApiResult<(StatusCode, Json<AddResponse>)> {
    let id = state.service.add(&params.url).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(AddResponse { id })))
}

pub async fn delete_url(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = UrlId::parse(&id).map_err(api_error)?;
    state.service.delete(&id).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Live list as JSON: each event carries the full ordered array
pub async fn live_urls(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    live_events(&state, |urls| {
        Event::default()
            .event("urls")
            .json_data(urls)
            .map_err(|e| e.to_string())
    })
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<DbStats>> {
    state.service.stats().map(Json).map_err(api_error)
}

fn live_events<F>(
    state: &AppState,
    to_event: F,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>> + use<F>>
where
    F: Fn(&[UrlRecord]) -> std::result::Result<Event, String> + Send + 'static,
{
    let stream = state.service.subscribe().into_stream().filter_map(
        move |snapshot: Result<Vec<UrlRecord>>| {
            let event = match snapshot {
                Ok(urls) => to_event(urls.as_slice())
                    .map_err(|e| format!("Failed to encode live list: {e}")),
                Err(e) => Err(format!("Failed to evaluate live list: {e}")),
            };
            async move {
                match event {
                    Ok(event) => Some(Ok(event)),
                    Err(e) => {
                        tracing::error!("{}", e);
                        None
                    }
                }
            }
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
