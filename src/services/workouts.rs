//! Workout use cases, one function per operation.
//!
//! Callers validate requests first (the extractors in `crate::extract` do
//! this for HTTP); these functions assume well-formed input.

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::dto::{
    CreateWorkoutRequest, GetWorkoutsQuery, PaginatedList, WorkoutResponse,
};
use crate::error::Result;
use crate::models::{NewExercise, NewWorkout};
use crate::repositories::{WorkoutFilter, WorkoutRepository};

/// Lists the caller's workouts matching `query`, most recent first.
pub async fn get_workouts(
    repo: &WorkoutRepository,
    user_id: &str,
    query: &GetWorkoutsQuery,
    cancel: &CancellationToken,
) -> Result<PaginatedList<WorkoutResponse>> {
    let filter = WorkoutFilter::for_owner(user_id)
        .search(query.search_term.as_deref())
        .from_date(query.from_date)
        .to_date(query.to_date);

    let (workouts, total_count) = repo
        .find_page(filter, query.offset(), query.page_size(), cancel)
        .await?;

    Ok(PaginatedList::new(workouts, total_count, query.page(), query.page_size())
        .map(WorkoutResponse::from))
}

/// Records a new workout for the caller, dated now. Returns its id.
pub async fn create_workout(
    repo: &WorkoutRepository,
    user_id: &str,
    request: CreateWorkoutRequest,
    cancel: &CancellationToken,
) -> Result<String> {
    let new_workout = NewWorkout {
        user_id: user_id.to_string(),
        name: request.name.trim().to_string(),
        date: Utc::now(),
        exercises: request
            .exercises
            .into_iter()
            .map(|e| NewExercise {
                name: e.name.trim().to_string(),
                sets: e.sets,
                reps: e.reps,
                weight: e.weight,
            })
            .collect(),
    };

    let workout = repo.create(new_workout, cancel).await?;
    tracing::info!(user_id, workout_id = %workout.id, "Workout created");

    Ok(workout.id)
}
