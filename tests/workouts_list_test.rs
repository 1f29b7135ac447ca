mod common;

use axum::http::{header, Request, StatusCode};
use axum::body::Body;
use banter_workout::dto::{PaginatedList, WorkoutResponse};
use chrono::{Duration, Utc};
use banter_workout::repositories::SessionRepository;
use tower::ServiceExt;

async fn list_page(
    pool: &banter_workout::db::DbPool,
    uri: &str,
    cookie: &str,
) -> PaginatedList<WorkoutResponse> {
    let response = common::get(common::create_test_app(pool.clone()), uri, Some(cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_value(common::body_json(response).await).unwrap()
}

fn names(page: &PaginatedList<WorkoutResponse>) -> Vec<&str> {
    page.items.iter().map(|w| w.name.as_str()).collect()
}

#[tokio::test]
async fn test_list_requires_auth() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = common::get(app, "/api/workouts", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_rejects_unknown_token() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = common::get(app, "/api/workouts", Some("session=not-a-real-token")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_rejects_expired_session() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "lapsed").await;
    let token = SessionRepository::new(pool.clone())
        .create_expiring(&user.id, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    let app = common::create_test_app(pool);
    let cookie = format!("session={}", token);
    let response = common::get(app, "/api/workouts", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_accepts_bearer_token() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "bearer").await;
    let token = SessionRepository::new(pool.clone())
        .create(&user.id)
        .await
        .unwrap();

    let app = common::create_test_app(pool);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/workouts")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_envelope_shape() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "shape").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    common::create_test_workout(&pool, &user.id, "Pull", 5, &["Row", "Curl"]).await;

    let app = common::create_test_app(pool);
    let response = common::get(app, "/api/workouts", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["pageNumber"], 1);
    assert_eq!(json["totalPages"], 1);
    assert_eq!(json["totalCount"], 1);
    assert_eq!(json["hasPreviousPage"], false);
    assert_eq!(json["hasNextPage"], false);

    let workout = &json["items"][0];
    assert_eq!(workout["name"], "Pull");
    assert_eq!(workout["isShared"], false);
    assert!(workout["date"].as_str().unwrap().starts_with("2024-01-05T09:00:00"));
    assert_eq!(workout["exercises"][0]["name"], "Row");
    assert_eq!(workout["exercises"][0]["sets"], 3);
    assert_eq!(workout["exercises"][0]["reps"], 10);
    assert_eq!(workout["exercises"][0]["weight"], 50.0);
    assert_eq!(workout["exercises"][1]["name"], "Curl");
}

#[tokio::test]
async fn test_first_page_of_three() {
    let pool = common::setup_test_db();
    let u = common::create_test_user(&pool, "u").await;
    common::create_test_user(&pool, "v").await;
    let cookie = common::create_session_cookie(&pool, &u).await;

    common::create_test_workout(&pool, &u.id, "Jan-1", 1, &[]).await;
    common::create_test_workout(&pool, &u.id, "Jan-3", 3, &[]).await;
    common::create_test_workout(&pool, &u.id, "Jan-2", 2, &[]).await;

    let page = list_page(&pool, "/api/workouts?page=1&pageSize=2", &cookie).await;
    assert_eq!(names(&page), vec!["Jan-3", "Jan-2"]);
    assert_eq!(page.total_count, 3);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next_page);
    assert!(!page.has_previous_page);

    let page = list_page(&pool, "/api/workouts?page=2&pageSize=2", &cookie).await;
    assert_eq!(names(&page), vec!["Jan-1"]);
    assert!(!page.has_next_page);
    assert!(page.has_previous_page);

    let page = list_page(&pool, "/api/workouts?page=3&pageSize=2", &cookie).await;
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 3);
}

#[tokio::test]
async fn test_never_returns_another_users_workouts() {
    let pool = common::setup_test_db();
    let alice = common::create_test_user(&pool, "alice").await;
    let bob = common::create_test_user(&pool, "bob").await;
    let cookie = common::create_session_cookie(&pool, &bob).await;

    common::create_test_workout(&pool, &alice.id, "Squat Day", 2, &["Squat"]).await;
    common::create_test_workout(&pool, &bob.id, "Bench Day", 3, &["Bench"]).await;

    for uri in [
        "/api/workouts",
        "/api/workouts?searchTerm=Squat",
        "/api/workouts?fromDate=2024-01-01&toDate=2024-01-31",
        "/api/workouts?pageSize=50",
    ] {
        let page = list_page(&pool, uri, &cookie).await;
        assert!(
            page.items.iter().all(|w| w.name == "Bench Day"),
            "{} leaked another user's workout",
            uri
        );
    }
}

#[tokio::test]
async fn test_search_by_workout_or_exercise_name() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "searcher").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    common::create_test_workout(&pool, &user.id, "Leg Day", 1, &["Squat"]).await;
    common::create_test_workout(&pool, &user.id, "Upper", 2, &["Overhead Press"]).await;
    common::create_test_workout(&pool, &user.id, "Cardio", 3, &["Rowing"]).await;

    let page = list_page(&pool, "/api/workouts?searchTerm=Leg", &cookie).await;
    assert_eq!(names(&page), vec!["Leg Day"]);

    let page = list_page(&pool, "/api/workouts?searchTerm=Press", &cookie).await;
    assert_eq!(names(&page), vec!["Upper"]);
    assert_eq!(page.total_count, 1);

    let page = list_page(&pool, "/api/workouts?searchTerm=%20%20", &cookie).await;
    assert_eq!(page.total_count, 3);
}

#[tokio::test]
async fn test_date_filters_are_inclusive_and_independent() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "dates").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    for day in 1..=5 {
        common::create_test_workout(&pool, &user.id, &format!("Day {}", day), day, &[]).await;
    }

    let page = list_page(
        &pool,
        "/api/workouts?fromDate=2024-01-02T09:00:00Z&toDate=2024-01-04T09:00:00Z",
        &cookie,
    )
    .await;
    assert_eq!(names(&page), vec!["Day 4", "Day 3", "Day 2"]);

    let page = list_page(&pool, "/api/workouts?fromDate=2024-01-04", &cookie).await;
    assert_eq!(names(&page), vec!["Day 5", "Day 4"]);

    let page = list_page(&pool, "/api/workouts?toDate=2024-01-02", &cookie).await;
    assert_eq!(names(&page), vec!["Day 1"]);
}

#[tokio::test]
async fn test_repeated_queries_return_identical_order() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "stable").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    for name in ["A", "B", "C", "D", "E"] {
        common::create_test_workout(&pool, &user.id, name, 7, &[]).await;
    }

    let uri = "/api/workouts?page=1&pageSize=3";
    let first = list_page(&pool, uri, &cookie).await;
    let second = list_page(&pool, uri, &cookie).await;
    assert_eq!(first, second);

    let rest = list_page(&pool, "/api/workouts?page=2&pageSize=3", &cookie).await;
    let mut seen: Vec<_> = first.items.iter().chain(rest.items.iter()).map(|w| w.id.clone()).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn test_validation_errors_are_itemized() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "validator").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    let app = common::create_test_app(pool.clone());
    let response = common::get(
        app,
        "/api/workouts?page=0&pageSize=51&fromDate=2024-02-01&toDate=2024-01-01",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = common::body_json(response).await;
    assert_eq!(json["error"], "Validation failed");
    let errors = json["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.contains_key("page"));
    assert!(errors.contains_key("pageSize"));
    assert!(errors.contains_key("toDate"));
}

#[tokio::test]
async fn test_validation_accepts_largest_page() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "maxpage").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    let page = list_page(&pool, "/api/workouts?page=1&pageSize=50", &cookie).await;
    assert!(page.items.is_empty());
    assert_eq!(page.total_pages, 0);
}

#[tokio::test]
async fn test_huge_page_number_is_an_empty_page() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "farpage").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    common::create_test_workout(&pool, &user.id, "Only", 1, &[]).await;

    let page = list_page(
        &pool,
        "/api/workouts?page=9223372036854775807&pageSize=50",
        &cookie,
    )
    .await;
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 1);
    assert_eq!(page.page_number, i64::MAX);
    assert!(!page.has_next_page);
}

#[tokio::test]
async fn test_unparseable_date_is_bad_request() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "baddate").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    let app = common::create_test_app(pool);
    let response = common::get(app, "/api/workouts?fromDate=last-tuesday", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
