use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::project::{CreateProject, Project};

use crate::{AppState, error::ApiError, routes::authenticate};

/// GET /api/projects — the caller's projects, newest first
pub async fn list_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ResponseJson<Vec<Project>>, ApiError> {
    let user = authenticate(&state, &headers)?;
    let projects = Project::find_by_user_id(&state.db.pool, user.id).await?;
    Ok(ResponseJson(projects))
}

/// POST /api/projects — create a project in `pending` state
pub async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<CreateProject>,
) -> Result<ResponseJson<Project>, ApiError> {
    let user = authenticate(&state, &headers)?;
    let project = Project::create(&state.db.pool, user.id, &payload).await?;
    Ok(ResponseJson(project))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/projects", get(list_projects).post(create_project))
}
