use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::service::UrlService;

pub mod routes;

/// Server state
pub struct AppState {
    pub service: UrlService,
}

/// Build the application router: the page, its no-JS form endpoints, and the JSON API
pub fn router(service: UrlService) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/", get(routes::index))
        .route("/live", get(routes::live_fragment))
        .route("/urls", post(routes::form_add))
        .route("/urls/{id}/delete", post(routes::form_delete))
        .route("/api/urls", get(routes::list_urls).post(routes::add_url))
        .route("/api/urls/live", get(routes::live_urls))
        .route("/api/urls/{id}", delete(routes::delete_url))
        .route("/api/stats", get(routes::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(settings: &Settings, service: UrlService) -> anyhow::Result<()> {
    let poller = service.watch_external(settings.poll_interval);
    let app = router(service);

    let listener = tokio::net::TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let result = axum::serve(listener, app).await;
    poller.abort();
    result?;

    Ok(())
}
