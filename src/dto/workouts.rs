use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{Exercise, Workout};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Query string of `GET /api/workouts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWorkoutsQuery {
    #[serde(default, deserialize_with = "deserialize_search_term")]
    pub search_term: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub from_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub to_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page_size: Option<i64>,
}

impl GetWorkoutsQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Rows to skip. Saturates instead of overflowing for huge page numbers,
    /// which then simply land past the last row.
    pub fn offset(&self) -> i64 {
        self.page()
            .saturating_sub(1)
            .saturating_mul(self.page_size())
    }
}

impl Validate for GetWorkoutsQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.page() <= 0 {
            errors.add("page", rule("range", "page must be greater than 0"));
        }

        let page_size = self.page_size();
        if page_size <= 0 {
            errors.add("pageSize", rule("range", "pageSize must be greater than 0"));
        } else if page_size > MAX_PAGE_SIZE {
            errors.add(
                "pageSize",
                rule("range", "pageSize must be less than or equal to 50"),
            );
        }

        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if to < from {
                errors.add(
                    "toDate",
                    rule("date_range", "toDate must be on or after fromDate"),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Body of `POST /api/workouts`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkoutRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub exercises: Vec<CreateExerciseRequest>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExerciseRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(range(min = 1, message = "sets must be at least 1"))]
    pub sets: i32,
    #[validate(range(min = 1, message = "reps must be at least 1"))]
    pub reps: i32,
    #[validate(range(min = 0.0, message = "weight must not be negative"))]
    pub weight: f64,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("blank", "must not be empty"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutResponse {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub exercises: Vec<ExerciseResponse>,
    pub is_shared: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseResponse {
    pub id: String,
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
}

impl From<Workout> for WorkoutResponse {
    fn from(w: Workout) -> Self {
        Self {
            id: w.id,
            name: w.name,
            date: w.date,
            exercises: w.exercises.into_iter().map(ExerciseResponse::from).collect(),
            is_shared: w.is_shared,
        }
    }
}

impl From<Exercise> for ExerciseResponse {
    fn from(e: Exercise) -> Self {
        Self {
            id: e.id,
            name: e.name,
            sets: e.sets,
            reps: e.reps,
            weight: e.weight,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// Deserialize an optional integer from a query string.
/// Handles empty strings by returning None instead of failing.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn deserialize_search_term<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) or a plain
/// `YYYY-MM-DD` (midnight UTC).
fn deserialize_optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_datetime(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
