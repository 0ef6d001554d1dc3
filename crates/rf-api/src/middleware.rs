//! rusty-forum/crates/rf-api/src/middleware.rs Middleware
//!
//! Login guards and response hardening.

use axum::{
    extract::{Path, Request},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Router,
};
use rf_core::models::Id;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_sessions::Session;

use crate::session::{add_error_flash, current_user_id};

pub const LOGIN_REQUIRED: &str = "Must be logged in!";

/// Guard for `/forum/{id}/...` routes. Anonymous visitors land on the forum.
pub async fn forum_login_required(
    session: Session,
    Path(id): Path<Id>,
    req: Request,
    next: Next,
) -> Response {
    login_required(session, format!("/forum/{id}"), req, next).await
}

/// Guard for `/topic/{id}/...` routes. Anonymous visitors land on the topic.
pub async fn topic_login_required(
    session: Session,
    Path(id): Path<Id>,
    req: Request,
    next: Next,
) -> Response {
    login_required(session, format!("/topic/{id}"), req, next).await
}

async fn login_required(session: Session, fallback: String, req: Request, next: Next) -> Response {
    match current_user_id(&session).await {
        Ok(Some(_)) => next.run(req).await,
        Ok(None) => {
            tracing::debug!(path = %req.uri().path(), "anonymous request to guarded route");
            if let Err(e) = add_error_flash(&session, LOGIN_REQUIRED).await {
                return e.into_response();
            }
            Redirect::to(&fallback).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Standard security headers. Handlers may still set their own.
pub fn security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'; object-src 'none'; frame-ancestors 'none'"),
        ))
}
