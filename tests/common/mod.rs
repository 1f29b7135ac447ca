#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use banter_workout::db::{create_memory_pool, DbPool};
use banter_workout::handlers::workouts::WorkoutsState;
use banter_workout::migrations::run_migrations;
use banter_workout::models::{NewExercise, NewWorkout, User, Workout};
use banter_workout::repositories::{SessionRepository, UserRepository, WorkoutRepository};

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations(&pool).expect("Failed to run migrations");
    pool
}

pub fn create_test_app(pool: DbPool) -> Router {
    let workouts_state = WorkoutsState {
        workout_repo: WorkoutRepository::new(pool.clone()),
        session_repo: SessionRepository::new(pool),
    };
    banter_workout::routes::create_router(workouts_state)
}

pub async fn create_test_user(pool: &DbPool, username: &str) -> User {
    let user_repo = UserRepository::new(pool.clone());
    user_repo
        .create(&format!("{}@example.com", username), username)
        .await
        .unwrap()
}

pub async fn create_session_cookie(pool: &DbPool, user: &User) -> String {
    let session_repo = SessionRepository::new(pool.clone());
    let token = session_repo.create(&user.id).await.unwrap();
    format!("session={}", token)
}

/// Inserts a workout dated at 09:00 UTC on the given January 2024 day.
pub async fn create_test_workout(
    pool: &DbPool,
    user_id: &str,
    name: &str,
    day: u32,
    exercises: &[&str],
) -> Workout {
    let workout_repo = WorkoutRepository::new(pool.clone());
    workout_repo
        .create(
            NewWorkout {
                user_id: user_id.to_string(),
                name: name.to_string(),
                date: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
                exercises: exercises
                    .iter()
                    .map(|name| NewExercise {
                        name: name.to_string(),
                        sets: 3,
                        reps: 10,
                        weight: 50.0,
                    })
                    .collect(),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap()
}

pub async fn get(app: Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(
    app: Router,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
