use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::models::{AssignmentResult, Professor, RunSnapshot, TeachingAssistant, WeightConfig};
use crate::services::materializer::{plan_links, MaterializationPlan};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Stored weights are not finite and non-negative: {0:?}")]
    InvalidWeights(WeightConfig),
}

/// PostgreSQL client for the assignment data set
///
/// Reads the per-run snapshot (TAs, professors, weights) and owns the
/// destructive full-replace write of `ta_assignment`.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Load all TAs with their professor preferences, best first
    pub async fn load_tas(&self) -> Result<Vec<TeachingAssistant>, PostgresError> {
        let mut conn = self.pool.acquire().await?;
        fetch_tas(&mut conn).await
    }

    /// Load all professors with their TA preferences, best first
    ///
    /// Capacity is not stored per professor; every professor gets `capacity`.
    pub async fn load_professors(&self, capacity: u32) -> Result<Vec<Professor>, PostgresError> {
        let mut conn = self.pool.acquire().await?;
        fetch_professors(&mut conn, capacity).await
    }

    /// Get the stored weight coefficients, if any
    pub async fn get_weights(&self) -> Result<Option<WeightConfig>, PostgresError> {
        let mut conn = self.pool.acquire().await?;
        fetch_weights(&mut conn).await
    }

    /// Store the weight coefficients, replacing any previous values
    pub async fn update_weights(&self, weights: &WeightConfig) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO weights (id, ta_pref, prof_pref, course_pref, workload_balance, updated_at)
            VALUES (1, $1, $2, $3, $4, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                ta_pref = EXCLUDED.ta_pref,
                prof_pref = EXCLUDED.prof_pref,
                course_pref = EXCLUDED.course_pref,
                workload_balance = EXCLUDED.workload_balance,
                updated_at = EXCLUDED.updated_at
        "#;

        sqlx::query(query)
            .bind(weights.ta_pref)
            .bind(weights.prof_pref)
            .bind(weights.course_pref)
            .bind(weights.workload_balance)
            .execute(&self.pool)
            .await?;

        tracing::info!("Updated weights: {:?}", weights);

        Ok(())
    }

    /// Load the immutable input of one assignment run
    ///
    /// All three reads share one read-only `REPEATABLE READ` transaction, so a
    /// concurrent write never shows up in only part of the snapshot. Falls back
    /// to `default_weights` when no weights row is stored.
    pub async fn load_snapshot(
        &self,
        professor_capacity: u32,
        default_weights: WeightConfig,
    ) -> Result<RunSnapshot, PostgresError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let tas = fetch_tas(&mut tx).await?;
        let professors = fetch_professors(&mut tx, professor_capacity).await?;
        let stored = fetch_weights(&mut tx).await?;

        tx.commit().await?;

        let weights = match stored {
            Some(weights) => weights,
            None => {
                tracing::warn!("No stored weights, using configured defaults: {:?}", default_weights);
                default_weights
            }
        };

        Ok(RunSnapshot {
            tas,
            professors,
            weights,
        })
    }

    /// Replace every persisted TA-course link with the links for `result`
    ///
    /// Runs in one transaction holding an exclusive lock on `ta_assignment`
    /// from before the course lookup until commit, so two concurrent runs never
    /// interleave their delete and insert steps.
    pub async fn replace_assignments(
        &self,
        result: &AssignmentResult,
        snapshot: &RunSnapshot,
    ) -> Result<MaterializationPlan, PostgresError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE ta_assignment IN ACCESS EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query(
            "SELECT professor_id, course_id FROM course_professor ORDER BY professor_id, course_id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut courses_by_professor: HashMap<i32, Vec<i32>> = HashMap::new();
        for row in &rows {
            let professor_id: i32 = row.try_get("professor_id")?;
            let course_id: i32 = row.try_get("course_id")?;
            courses_by_professor.entry(professor_id).or_default().push(course_id);
        }

        let plan = plan_links(result, &snapshot.tas, &snapshot.professors, &courses_by_professor);

        let deleted = sqlx::query("DELETE FROM ta_assignment")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if !plan.links.is_empty() {
            let (ta_ids, course_ids): (Vec<i32>, Vec<i32>) = plan
                .links
                .iter()
                .map(|link| (link.ta_id, link.course_id))
                .unzip();

            sqlx::query(
                r#"
                INSERT INTO ta_assignment (ta_id, course_id)
                SELECT * FROM UNNEST($1::INT4[], $2::INT4[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(&ta_ids)
            .bind(&course_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Replaced {} TA assignment rows with {} new links",
            deleted,
            plan.links.len()
        );

        Ok(plan)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

async fn fetch_tas(conn: &mut PgConnection) -> Result<Vec<TeachingAssistant>, PostgresError> {
    let query = r#"
        SELECT
            t.ta_id,
            t.name,
            t.max_hours,
            COALESCE(
                ARRAY_AGG(p.name ORDER BY tpp.pref_order, p.name)
                    FILTER (WHERE p.professor_id IS NOT NULL),
                ARRAY[]::TEXT[]
            ) AS preferred_names
        FROM ta t
        LEFT JOIN ta_preferred_professor tpp ON tpp.ta_id = t.ta_id
        LEFT JOIN professor p ON p.professor_id = tpp.professor_id
        GROUP BY t.ta_id, t.name, t.max_hours
        ORDER BY t.name ASC
    "#;

    let rows = sqlx::query(query).fetch_all(&mut *conn).await?;

    let tas = rows
        .iter()
        .map(|row| -> Result<TeachingAssistant, sqlx::Error> {
            let max_hours: i32 = row.try_get("max_hours")?;
            Ok(TeachingAssistant {
                id: row.try_get("ta_id")?,
                name: row.try_get("name")?,
                preferred_professors: row.try_get("preferred_names")?,
                max_hours: decode_max_hours(max_hours)?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    tracing::debug!("Loaded {} teaching assistants", tas.len());

    Ok(tas)
}

async fn fetch_professors(
    conn: &mut PgConnection,
    capacity: u32,
) -> Result<Vec<Professor>, PostgresError> {
    let query = r#"
        SELECT
            p.professor_id,
            p.name,
            COALESCE(
                ARRAY_AGG(t.name ORDER BY ppt.pref_order, t.name)
                    FILTER (WHERE t.ta_id IS NOT NULL),
                ARRAY[]::TEXT[]
            ) AS preferred_names
        FROM professor p
        LEFT JOIN professor_preferred_ta ppt ON ppt.professor_id = p.professor_id
        LEFT JOIN ta t ON t.ta_id = ppt.ta_id
        GROUP BY p.professor_id, p.name
        ORDER BY p.name ASC
    "#;

    let rows = sqlx::query(query).fetch_all(&mut *conn).await?;

    let professors = rows
        .iter()
        .map(|row| -> Result<Professor, sqlx::Error> {
            Ok(Professor {
                id: row.try_get("professor_id")?,
                name: row.try_get("name")?,
                preferred_tas: row.try_get("preferred_names")?,
                capacity,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    tracing::debug!("Loaded {} professors", professors.len());

    Ok(professors)
}

async fn fetch_weights(conn: &mut PgConnection) -> Result<Option<WeightConfig>, PostgresError> {
    let query = r#"
        SELECT ta_pref, prof_pref, course_pref, workload_balance
        FROM weights
        WHERE id = 1
    "#;

    let Some(row) = sqlx::query(query).fetch_optional(&mut *conn).await? else {
        return Ok(None);
    };

    let weights = WeightConfig {
        ta_pref: row.try_get("ta_pref")?,
        prof_pref: row.try_get("prof_pref")?,
        course_pref: row.try_get("course_pref")?,
        workload_balance: row.try_get("workload_balance")?,
    };

    // CHECK (x >= 0) still admits 'NaN'
    if !weights.is_usable() {
        return Err(PostgresError::InvalidWeights(weights));
    }

    Ok(Some(weights))
}

/// Convert the `max_hours` column, reporting out-of-range values as decode errors
fn decode_max_hours(value: i32) -> Result<u32, sqlx::Error> {
    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: "max_hours".to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_max_hours_accepts_positive() {
        assert_eq!(decode_max_hours(3).unwrap(), 3);
    }

    #[test]
    fn test_decode_max_hours_rejects_negative() {
        let err = decode_max_hours(-1).unwrap_err();
        assert!(matches!(err, sqlx::Error::ColumnDecode { ref index, .. } if index == "max_hours"));
    }
}
