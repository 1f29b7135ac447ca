pub mod user;
pub mod workout;

use rusqlite::Row;

pub use user::User;
pub use workout::{Exercise, NewExercise, NewWorkout, Workout};

/// Builds a model from a row selected with named columns.
pub trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}
