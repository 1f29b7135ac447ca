use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::handlers::{health, workouts};

pub fn create_router(workouts_state: workouts::WorkoutsState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/workouts",
            get(workouts::list).post(workouts::create),
        )
        .fallback(not_found)
        .with_state(workouts_state)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
