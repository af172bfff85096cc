use crate::model::{WorkoutRecord, WorkoutTestRecord};
use trai_database::{Database, DatabaseError, DatabaseErrorExt};

#[derive(Debug, Clone, Copy)]
pub struct WorkoutStore;

impl WorkoutStore {
    /// # Errors
    /// Storage failures.
    pub async fn create(db: &Database, workout: WorkoutRecord) -> Result<(), DatabaseError> {
        db.query("CREATE workout CONTENT $workout RETURN NONE")
            .bind(("workout", workout))
            .await
            .context("Creating workout")?
            .check()
            .context("Creating workout")?;
        Ok(())
    }

    /// The user's workouts, newest first.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn list(db: &Database, user_id: &str) -> Result<Vec<WorkoutRecord>, DatabaseError> {
        let workouts: Vec<WorkoutRecord> = db
            .query("SELECT * OMIT id FROM workout WHERE user_id = $user ORDER BY scheduled_at DESC")
            .bind(("user", user_id.to_owned()))
            .await
            .context("Listing workouts")?
            .take(0)
            .context("Decoding workouts")?;
        Ok(workouts)
    }

    /// Up to `limit` most recent workouts, returned oldest first.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn recent(db: &Database, user_id: &str, limit: i64) -> Result<Vec<WorkoutRecord>, DatabaseError> {
        let mut workouts: Vec<WorkoutRecord> = db
            .query("SELECT * OMIT id FROM workout WHERE user_id = $user ORDER BY scheduled_at DESC LIMIT $limit")
            .bind(("user", user_id.to_owned()))
            .bind(("limit", limit))
            .await
            .context("Loading recent workouts")?
            .take(0)
            .context("Decoding workouts")?;
        workouts.reverse();
        Ok(workouts)
    }

    /// A workout only if it belongs to `user_id`.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn find_owned(
        db: &Database,
        user_id: &str,
        key: &str,
    ) -> Result<Option<WorkoutRecord>, DatabaseError> {
        let mut workouts: Vec<WorkoutRecord> = db
            .query("SELECT * OMIT id FROM workout WHERE key = $key AND user_id = $user LIMIT 1")
            .bind(("key", key.to_owned()))
            .bind(("user", user_id.to_owned()))
            .await
            .context("Loading workout")?
            .take(0)
            .context("Decoding workout")?;
        Ok(workouts.pop())
    }

    /// Deletes an owned workout and its tests. `false` when nothing matched.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn delete_owned(db: &Database, user_id: &str, key: &str) -> Result<bool, DatabaseError> {
        if Self::find_owned(db, user_id, key).await?.is_none() {
            return Ok(false);
        }
        db.query(
            "BEGIN TRANSACTION;\
             DELETE workout_test WHERE workout_id = $key AND user_id = $user;\
             DELETE workout WHERE key = $key AND user_id = $user;\
             COMMIT TRANSACTION;",
        )
        .bind(("key", key.to_owned()))
        .bind(("user", user_id.to_owned()))
        .await
        .context("Deleting workout")?
        .check()
        .context("Deleting workout")?;
        Ok(true)
    }

    /// Marks the workout completed and stores its test. Only a workout that is
    /// still open flips, so of two racing completions exactly one gets `true`;
    /// the loser stores nothing.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn complete(
        db: &Database,
        test: WorkoutTestRecord,
        total_weight_lifted: f64,
    ) -> Result<bool, DatabaseError> {
        let flipped: Vec<String> = db
            .query(
                "UPDATE workout SET completed = true, completed_at = $at, total_weight_lifted = $total \
                 WHERE key = $workout AND user_id = $user AND completed = false RETURN VALUE key",
            )
            .bind(("at", test.created_at.clone()))
            .bind(("total", total_weight_lifted))
            .bind(("workout", test.workout_id.clone()))
            .bind(("user", test.user_id.clone()))
            .await
            .context("Completing workout")?
            .take(0)
            .context("Decoding completed workout")?;
        if flipped.is_empty() {
            return Ok(false);
        }

        db.query("CREATE workout_test CONTENT $test RETURN NONE")
            .bind(("test", test))
            .await
            .context("Storing workout test")?
            .check()
            .context("Storing workout test")?;
        Ok(true)
    }

    /// Completed workouts with `completed_at` in `[from, to)`.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn completed_between(
        db: &Database,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<WorkoutRecord>, DatabaseError> {
        let workouts: Vec<WorkoutRecord> = db
            .query(
                "SELECT * OMIT id FROM workout \
                 WHERE user_id = $user AND completed = true AND completed_at >= $from AND completed_at < $to \
                 ORDER BY completed_at ASC",
            )
            .bind(("user", user_id.to_owned()))
            .bind(("from", from.to_owned()))
            .bind(("to", to.to_owned()))
            .await
            .context("Loading completed workouts")?
            .take(0)
            .context("Decoding workouts")?;
        Ok(workouts)
    }

    /// The user's latest questionnaires, oldest first.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn recent_tests(
        db: &Database,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<WorkoutTestRecord>, DatabaseError> {
        let mut tests: Vec<WorkoutTestRecord> = db
            .query("SELECT * OMIT id FROM workout_test WHERE user_id = $user ORDER BY created_at DESC LIMIT $limit")
            .bind(("user", user_id.to_owned()))
            .bind(("limit", limit))
            .await
            .context("Loading workout tests")?
            .take(0)
            .context("Decoding workout tests")?;
        tests.reverse();
        Ok(tests)
    }
}
