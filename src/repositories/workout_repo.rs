use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ToSql};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::db::{DbConnection, DbPool};
use crate::error::{AppError, Result};
use crate::models::{Exercise, FromSqliteRow, NewWorkout, Workout};

/// Restricts a workout listing to one owner plus optional search and date
/// bounds. Every predicate is rendered as SQL with bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutFilter {
    user_id: String,
    search_pattern: Option<String>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
}

impl WorkoutFilter {
    pub fn for_owner(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            search_pattern: None,
            from_date: None,
            to_date: None,
        }
    }

    /// Blank terms are ignored. Others match as given, whitespace included.
    pub fn search(mut self, term: Option<&str>) -> Self {
        self.search_pattern = term
            .filter(|t| !t.trim().is_empty())
            .map(like_pattern);
        self
    }

    pub fn from_date(mut self, from: Option<DateTime<Utc>>) -> Self {
        self.from_date = from;
        self
    }

    pub fn to_date(mut self, to: Option<DateTime<Utc>>) -> Self {
        self.to_date = to;
        self
    }

    fn where_clause(&self) -> (String, Vec<&dyn ToSql>) {
        let mut predicates = vec!["w.user_id = ?"];
        let mut params: Vec<&dyn ToSql> = vec![&self.user_id];

        if let Some(pattern) = &self.search_pattern {
            predicates.push(
                "(w.name LIKE ? ESCAPE '\\' OR EXISTS (
                    SELECT 1 FROM exercises e
                    WHERE e.workout_id = w.id AND e.name LIKE ? ESCAPE '\\'))",
            );
            params.push(pattern);
            params.push(pattern);
        }
        if let Some(from) = &self.from_date {
            predicates.push("w.date >= ?");
            params.push(from);
        }
        if let Some(to) = &self.to_date {
            predicates.push("w.date <= ?");
            params.push(to);
        }

        (predicates.join(" AND "), params)
    }
}

/// Wraps a search term for a `LIKE ... ESCAPE '\'` substring match.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    Ok(())
}

#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inserts the workout and all of its exercises in one transaction.
    pub async fn create(
        &self,
        new_workout: NewWorkout,
        cancel: &CancellationToken,
    ) -> Result<Workout> {
        self.interruptible(cancel, move |conn, cancel| {
            let tx = conn.transaction()?;

            let workout_id = Uuid::new_v4().to_string();
            let created_at = Utc::now();

            tx.execute(
                "INSERT INTO workouts (id, user_id, name, date, is_shared, created_at)
                 VALUES (?, ?, ?, ?, 0, ?)",
                params![
                    workout_id,
                    new_workout.user_id,
                    new_workout.name,
                    new_workout.date,
                    created_at
                ],
            )?;

            let mut exercises = Vec::with_capacity(new_workout.exercises.len());
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO exercises (id, workout_id, position, name, sets, reps, weight)
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )?;
                for (position, new_exercise) in new_workout.exercises.into_iter().enumerate() {
                    ensure_not_cancelled(cancel)?;

                    let exercise = Exercise {
                        id: Uuid::new_v4().to_string(),
                        workout_id: workout_id.clone(),
                        position: position as i32,
                        name: new_exercise.name,
                        sets: new_exercise.sets,
                        reps: new_exercise.reps,
                        weight: new_exercise.weight,
                    };
                    stmt.execute(params![
                        exercise.id,
                        exercise.workout_id,
                        exercise.position,
                        exercise.name,
                        exercise.sets,
                        exercise.reps,
                        exercise.weight
                    ])?;
                    exercises.push(exercise);
                }
            }

            ensure_not_cancelled(cancel)?;
            tx.commit()?;

            tracing::debug!(
                workout_id = %workout_id,
                exercises = exercises.len(),
                "Created workout"
            );

            Ok(Workout {
                id: workout_id,
                user_id: new_workout.user_id,
                name: new_workout.name,
                date: new_workout.date,
                is_shared: false,
                created_at,
                exercises,
            })
        })
        .await
    }

    /// Counts every workout matching `filter` and fetches one page of them,
    /// most recent first, with exercises attached. Both reads share one
    /// transaction and therefore one snapshot.
    pub async fn find_page(
        &self,
        filter: WorkoutFilter,
        offset: i64,
        limit: i64,
        cancel: &CancellationToken,
    ) -> Result<(Vec<Workout>, i64)> {
        self.interruptible(cancel, move |conn, cancel| {
            let tx = conn.transaction()?;
            let (clause, params) = filter.where_clause();

            let total: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM workouts w WHERE {}", clause),
                params.as_slice(),
                |row| row.get(0),
            )?;

            ensure_not_cancelled(cancel)?;

            let mut workouts = if (0..total).contains(&offset) {
                let mut page_params = params.clone();
                page_params.push(&limit);
                page_params.push(&offset);

                let mut stmt = tx.prepare(&format!(
                    "SELECT w.* FROM workouts w WHERE {}
                     ORDER BY w.date DESC, w.id ASC
                     LIMIT ? OFFSET ?",
                    clause
                ))?;
                let rows = stmt
                    .query_map(page_params.as_slice(), Workout::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            } else {
                Vec::new()
            };

            ensure_not_cancelled(cancel)?;
            attach_exercises(&tx, &mut workouts)?;
            tx.commit()?;

            tracing::debug!(total, returned = workouts.len(), offset, limit, "Listed workouts");
            Ok((workouts, total))
        })
        .await
    }

    /// Runs `op` on a pooled connection off the async runtime. Cancelling the
    /// token interrupts the statement in flight; any open transaction is
    /// rolled back when `op` unwinds.
    async fn interruptible<T, F>(&self, cancel: &CancellationToken, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut DbConnection, &CancellationToken) -> Result<T> + Send + 'static,
    {
        ensure_not_cancelled(cancel)?;

        let pool = self.pool.clone();
        let cancel = cancel.clone();
        let runtime = tokio::runtime::Handle::current();

        tokio::task::spawn_blocking(move || -> Result<T> {
            let mut conn = pool.get()?;

            let interrupt = conn.get_interrupt_handle();
            let watched = cancel.clone();
            let watcher = runtime.spawn(async move {
                watched.cancelled().await;
                interrupt.interrupt();
            });

            let result = op(&mut conn, &cancel);
            watcher.abort();

            match result {
                Err(e) if cancel.is_cancelled() => {
                    tracing::debug!("Store operation aborted: {}", e);
                    Err(AppError::Cancelled)
                }
                other => other,
            }
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn attach_exercises(conn: &Connection, workouts: &mut [Workout]) -> Result<()> {
    if workouts.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; workouts.len()].join(", ");
    let exercises = {
        let ids: Vec<&dyn ToSql> = workouts.iter().map(|w| &w.id as &dyn ToSql).collect();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM exercises WHERE workout_id IN ({}) ORDER BY workout_id, position",
            placeholders
        ))?;
        let rows = stmt
            .query_map(ids.as_slice(), Exercise::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };

    let mut by_workout: HashMap<String, Vec<Exercise>> = HashMap::new();
    for exercise in exercises {
        by_workout
            .entry(exercise.workout_id.clone())
            .or_default()
            .push(exercise);
    }
    for workout in workouts.iter_mut() {
        workout.exercises = by_workout.remove(&workout.id).unwrap_or_default();
    }

    Ok(())
}
