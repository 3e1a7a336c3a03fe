pub mod generate;
pub mod health;
pub mod keys;
pub mod profile;
pub mod projects;

use axum::{
    Router,
    http::{HeaderMap, header},
};
use utils::auth::{AuthUser, bearer_token};

use crate::{AppState, error::ApiError};

/// Resolve the request's bearer credential to a user identity.
pub(crate) fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header)?;
    Ok(state.verifier.verify(token)?)
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(health::router())
            .merge(generate::router())
            .merge(profile::router())
            .merge(projects::router())
            .merge(keys::router()),
    )
}
