//! Request and response shapes of the HTTP API.

pub mod pagination;
pub mod workouts;

pub use pagination::PaginatedList;
pub use workouts::{
    CreateExerciseRequest, CreateWorkoutRequest, CreatedResponse, ExerciseResponse,
    GetWorkoutsQuery, WorkoutResponse,
};
