//! Session-backed sign-in state and flash messages.
//!
//! Flashes are one-shot: they are appended under their key and removed when
//! the next page renders.

use rf_core::models::Id;
use tower_sessions::Session;

use crate::error::ApiError;

pub const USER_ID_KEY: &str = "user_id";
pub const ERROR_FLASHES: &str = "error";
pub const SUCCESS_FLASHES: &str = "success";

pub async fn add_flash(session: &Session, key: &str, message: impl Into<String>) -> Result<(), ApiError> {
    let mut messages: Vec<String> = session.get(key).await?.unwrap_or_default();
    messages.push(message.into());
    session.insert(key, messages).await?;
    Ok(())
}

pub async fn add_error_flash(session: &Session, message: impl Into<String>) -> Result<(), ApiError> {
    add_flash(session, ERROR_FLASHES, message).await
}

pub async fn add_error_flashes(session: &Session, messages: &[String]) -> Result<(), ApiError> {
    for message in messages {
        add_error_flash(session, message.as_str()).await?;
    }
    Ok(())
}

pub async fn add_success_flash(session: &Session, message: impl Into<String>) -> Result<(), ApiError> {
    add_flash(session, SUCCESS_FLASHES, message).await
}

/// Reads and clears the flashes stored under `key`.
pub async fn take_flashes(session: &Session, key: &str) -> Result<Vec<String>, ApiError> {
    Ok(session.remove::<Vec<String>>(key).await?.unwrap_or_default())
}

pub async fn current_user_id(session: &Session) -> Result<Option<Id>, ApiError> {
    Ok(session.get::<Id>(USER_ID_KEY).await?)
}

/// Rotates the session id before storing the user, so a pre-login id is
/// never authenticated.
pub async fn sign_in(session: &Session, user_id: Id) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    Ok(())
}

pub async fn sign_out(session: &Session) -> Result<(), ApiError> {
    session.remove::<Id>(USER_ID_KEY).await?;
    Ok(())
}
