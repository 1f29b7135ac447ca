use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::FromSqliteRow;

/// A persisted workout together with its exercises in recorded order.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
}

impl FromSqliteRow for Workout {
    /// Exercises live in their own table and are attached by the repository.
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            date: row.get("date")?,
            is_shared: row.get("is_shared")?,
            created_at: row.get("created_at")?,
            exercises: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub workout_id: String,
    pub position: i32,
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            workout_id: row.get("workout_id")?,
            position: row.get("position")?,
            name: row.get("name")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            weight: row.get("weight")?,
        })
    }
}

/// Everything needed to insert a workout; identities are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub user_id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub exercises: Vec<NewExercise>,
}

#[derive(Debug, Clone)]
pub struct NewExercise {
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
}
