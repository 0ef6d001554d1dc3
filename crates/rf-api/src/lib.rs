//! # rf-api
//!
//! The web routing and orchestration layer for Rusty-Forum.

pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, MemoryStore, SessionManagerLayer};

pub const SESSION_COOKIE: &str = "rusty-forum-session";

/// Builds the full application: routes, login guards, sessions, static
/// files, compression, tracing and security headers.
pub fn router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_name(SESSION_COOKIE)
        .with_http_only(true);

    let forum_members = Router::new()
        .route(
            "/forum/{id}/add",
            get(handlers::add_topic_form).post(handlers::save_topic),
        )
        .route_layer(from_fn(middleware::forum_login_required));

    let topic_members = Router::new()
        .route(
            "/topic/{id}/add",
            get(handlers::add_post_form).post(handlers::save_post),
        )
        .route("/topic/{id}/delete", post(handlers::delete_post))
        .route_layer(from_fn(middleware::topic_login_required));

    let static_files = ServeDir::new(&state.server.static_dir);

    let app = Router::new()
        .route("/", get(handlers::index))
        .route("/forum/{id}", get(handlers::show_forum))
        .route("/forum/{id}/page/{page}", get(handlers::show_forum_page))
        .route("/topic/{id}", get(handlers::show_topic))
        .route("/topic/{id}/page/{page}", get(handlers::show_topic_page))
        .route(
            "/user/add",
            get(handlers::register_form).post(handlers::register),
        )
        .route("/user/login", get(handlers::login_form).post(handlers::login))
        .route("/user/logout", get(handlers::logout))
        .merge(forum_members)
        .merge(topic_members)
        .nest_service("/static", static_files)
        .layer(session_layer);

    middleware::security_headers(app)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
