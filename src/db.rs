use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::{
    court::Court,
    error::StoreError,
    schedule::WeeklySchedule,
    traits::{Clock, TrainingStore},
    training::Training,
};

/// A court as stored; the weekly schedule is kept as a JSON map.
#[derive(Debug, Clone, FromRow)]
struct CourtRow {
    id: String,
    name: String,
    location: String,
    available: bool,
    weekly_schedule: String,
    opening_hour: Option<String>,
    closing_hour: Option<String>,
    active_days_csv: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl CourtRow {
    /// Rows written before per-day schedules existed (empty schedule, legacy
    /// columns set) get their days filled from the legacy columns.
    fn into_court(self) -> Result<Court, StoreError> {
        let weekly_schedule: WeeklySchedule = serde_json::from_str(&self.weekly_schedule)?;
        let mut court = Court {
            id: self.id,
            name: self.name,
            location: self.location,
            available: self.available,
            weekly_schedule,
            opening_hour: self.opening_hour,
            closing_hour: self.closing_hour,
            active_days_csv: self.active_days_csv,
            created_at: self.created_at,
        };
        court.upgrade_legacy();
        Ok(court)
    }
}

#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    // ==================== Courts ====================

    /// Insert a court. An empty id lets the database assign one.
    pub async fn insert_court(&self, court: &Court) -> Result<String, StoreError> {
        let schedule = serde_json::to_string(&court.weekly_schedule)?;
        let id: String = sqlx::query_scalar(
            r#"
            INSERT INTO courts (id, name, location, available, weekly_schedule,
                                opening_hour, closing_hour, active_days_csv, created_at)
            VALUES (COALESCE(NULLIF($1, ''), gen_random_uuid()::text), $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&court.id)
        .bind(&court.name)
        .bind(&court.location)
        .bind(court.available)
        .bind(schedule)
        .bind(&court.opening_hour)
        .bind(&court.closing_hour)
        .bind(&court.active_days_csv)
        .bind(court.created_at.unwrap_or_else(Utc::now))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn get_court(&self, id: &str) -> Result<Option<Court>, StoreError> {
        let row = sqlx::query_as::<_, CourtRow>("SELECT * FROM courts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CourtRow::into_court).transpose()
    }

    pub async fn list_courts(&self) -> Result<Vec<Court>, StoreError> {
        let rows = sqlx::query_as::<_, CourtRow>("SELECT * FROM courts ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CourtRow::into_court).collect()
    }

    /// Update a court's name, location, availability and weekly schedule.
    pub async fn update_court(&self, court: &Court) -> Result<(), StoreError> {
        let schedule = serde_json::to_string(&court.weekly_schedule)?;
        let result = sqlx::query(
            r#"
            UPDATE courts
            SET name = $1, location = $2, available = $3, weekly_schedule = $4,
                opening_hour = $5, closing_hour = $6, active_days_csv = $7
            WHERE id = $8
            "#,
        )
        .bind(&court.name)
        .bind(&court.location)
        .bind(court.available)
        .bind(schedule)
        .bind(&court.opening_hour)
        .bind(&court.closing_hour)
        .bind(&court.active_days_csv)
        .bind(&court.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: "court",
                id: court.id.clone(),
            });
        }
        Ok(())
    }

    /// Delete a court that no training references any more.
    pub async fn delete_court(&self, id: &str) -> Result<(), StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trainings WHERE court_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if count > 0 {
            return Err(StoreError::CourtInUse {
                court_id: id.to_string(),
                count,
            });
        }

        let result = sqlx::query("DELETE FROM courts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: "court",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==================== Trainings ====================

    /// Export all trainings of a court to a CSV file.
    ///
    /// # Arguments
    /// * `court_id` - Court whose trainings are exported
    /// * `output_dir` - Directory where the CSV file will be created
    /// * `clock` - Clock for generating the timestamp in the filename
    ///
    /// # Returns
    /// The path to the created CSV file on success.
    pub async fn export_to_csv<C: Clock>(
        &self,
        court_id: &str,
        output_dir: &Path,
        clock: &C,
    ) -> Result<PathBuf> {
        let trainings = self
            .trainings_for_court(court_id)
            .await
            .context("Failed to fetch trainings for export")?;

        write_trainings_csv(trainings, output_dir, court_id, clock).await
    }
}

impl TrainingStore for Database {
    async fn trainings_for_court(&self, court_id: &str) -> Result<Vec<Training>, StoreError> {
        let trainings = sqlx::query_as::<_, Training>(
            "SELECT * FROM trainings WHERE court_id = $1 ORDER BY date ASC, start_time ASC",
        )
        .bind(court_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(trainings)
    }

    async fn save_training(&self, training: &Training) -> Result<String, StoreError> {
        let id: String = sqlx::query_scalar(
            r#"
            INSERT INTO trainings (id, team_id, team_name, team_color, court_id, court_name,
                                   day_of_week, start_time, end_time, date, notes,
                                   created_at, created_by)
            VALUES (COALESCE(NULLIF($1, ''), gen_random_uuid()::text),
                    $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                team_id = EXCLUDED.team_id,
                team_name = EXCLUDED.team_name,
                team_color = EXCLUDED.team_color,
                court_id = EXCLUDED.court_id,
                court_name = EXCLUDED.court_name,
                day_of_week = EXCLUDED.day_of_week,
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time,
                date = EXCLUDED.date,
                notes = EXCLUDED.notes
            RETURNING id
            "#,
        )
        .bind(&training.id)
        .bind(&training.team_id)
        .bind(&training.team_name)
        .bind(&training.team_color)
        .bind(&training.court_id)
        .bind(&training.court_name)
        .bind(&training.day_of_week)
        .bind(&training.start_time)
        .bind(&training.end_time)
        .bind(training.date)
        .bind(&training.notes)
        .bind(training.created_at)
        .bind(&training.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn delete_training(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM trainings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: "training",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

/// Write `trainings` to `<output_dir>/trainings_<court>_<timestamp>.csv`.
pub async fn write_trainings_csv<C: Clock>(
    trainings: Vec<Training>,
    output_dir: &Path,
    court_id: &str,
    clock: &C,
) -> Result<PathBuf> {
    let export_time = clock.now_utc();
    let filename = format!(
        "trainings_{}_{}.csv",
        court_id,
        export_time.format("%Y%m%d_%H%M%S")
    );

    let output_path = output_dir.join(&filename);
    let path = output_path.clone();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut wtr = csv::Writer::from_path(&path).context("Failed to create CSV writer")?;

        for training in trainings {
            wtr.serialize(training)
                .context("Failed to serialize training")?;
        }

        wtr.flush().context("Failed to flush CSV writer")?;
        Ok(())
    })
    .await
    .context("CSV export task failed")??;

    Ok(output_path)
}
