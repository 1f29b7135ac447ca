use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::dto::{
    CreateWorkoutRequest, CreatedResponse, GetWorkoutsQuery, PaginatedList, WorkoutResponse,
};
use crate::error::Result;
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::AuthUser;
use crate::repositories::{SessionRepository, WorkoutRepository};
use crate::services::workouts as service;

#[derive(Clone, FromRef)]
pub struct WorkoutsState {
    pub workout_repo: WorkoutRepository,
    pub session_repo: SessionRepository,
}

/// Token cancelled when the request future is dropped, e.g. on client
/// disconnect.
fn request_cancellation() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

pub async fn list(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    ValidatedQuery(query): ValidatedQuery<GetWorkoutsQuery>,
) -> Result<Json<PaginatedList<WorkoutResponse>>> {
    let (cancel, _guard) = request_cancellation();

    let page = service::get_workouts(&state.workout_repo, &auth_user.id, &query, &cancel).await?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let (cancel, _guard) = request_cancellation();

    let id = service::create_workout(&state.workout_repo, &auth_user.id, request, &cancel).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}
