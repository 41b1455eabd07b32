//! Backend-for-frontend for the Revalio community forum.
//!
//! Fetches raw forum payloads from the Revalio REST backend and turns them
//! into UI-ready data: a flat comment list with reply linkage, ownership and
//! like state (`comments::builder`), and normalized, ranked thread summaries
//! (`threads::ranking`). The engines and the page view-model are plain
//! library code and can be used without the HTTP layer.

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod authors;
pub mod comments;
pub mod config;
pub mod error;
pub mod payload;
pub mod response;
pub mod threads;
pub mod upstream;
pub mod view_model;

use config::settings::Settings;
use upstream::RevalioClient;

#[derive(Clone)]
pub struct AppState {
    client: RevalioClient,
    settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let client = RevalioClient::new(&settings)?;
        Ok(Self { client, settings })
    }
}

impl FromRef<AppState> for RevalioClient {
    fn from_ref(app_state: &AppState) -> RevalioClient {
        app_state.client.clone()
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(app_state: &AppState) -> Settings {
        app_state.settings.clone()
    }
}

pub fn router(app_state: AppState) -> Router {
    let thread_router = Router::new()
        .route("/", get(threads::handler::get_threads))
        .route("/:id/comments", get(comments::handler::get_thread_comments))
        .route(
            "/:id/comments/:comment_id/replies",
            get(comments::handler::get_comment_replies),
        )
        .route(
            "/:id/comments/:comment_id/like",
            post(comments::handler::toggle_comment_like),
        );

    Router::new()
        .route("/", get(|| async { "Revalio forum is up" }))
        .nest("/api/threads", thread_router)
        .with_state(app_state)
}
