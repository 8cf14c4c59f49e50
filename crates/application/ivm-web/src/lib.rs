//! IVM Showroom Web Server
//!
//! JSON API behind the showroom site: the static catalog, per-visitor
//! showroom state (cookie-keyed, persisted like browser local storage),
//! the generative video workflow and the text proxy. Generated videos are
//! served from the data directory under `/videos`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let video_routes = Router::new()
        .route(
            "/api/gemini/generate-and-save",
            get(handlers::showcase_status).post(handlers::generate_showcase),
        )
        .route("/api/gemini/poll-video", get(handlers::poll_showcase))
        .route(
            "/api/gemini/generate-hero-video",
            get(handlers::hero_status).post(handlers::generate_hero),
        )
        .route("/api/gemini/poll-hero-video", get(handlers::poll_hero))
        .route(
            "/api/gemini/video",
            get(handlers::direct_poll).post(handlers::direct_generate),
        )
        .route("/api/gemini", post(handlers::generate_text))
        .route("/api/gemini/test-api", get(handlers::test_api));

    let showroom_routes = Router::new()
        .route("/api/models", get(handlers::list_models))
        .route("/api/models/:id", get(handlers::get_model))
        .route("/api/showroom", get(handlers::showroom))
        .route("/api/showroom/compare", delete(handlers::clear_compare))
        .route(
            "/api/showroom/compare/:id",
            post(handlers::add_to_compare).delete(handlers::remove_from_compare),
        )
        .route("/api/showroom/saved/:id", post(handlers::toggle_saved))
        .route("/api/showroom/selection", post(handlers::update_selection))
        .route(
            "/api/contact/draft",
            post(handlers::update_draft).delete(handlers::clear_draft),
        )
        .route("/api/contact", post(handlers::submit_contact));

    let videos_dir = state.videos.videos_dir().to_path_buf();

    Router::new()
        .route("/api/health", get(handlers::health))
        .merge(video_routes)
        .merge(showroom_routes)
        .nest_service("/videos", ServeDir::new(videos_dir))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("IVM showroom listening on http://{}", addr);

    axum::serve(listener, app).await
}
