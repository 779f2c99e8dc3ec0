use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{AttendanceRecord, AttendanceRecordWithBreaks, BreakInterval};
use crate::error::AppError;
use crate::services::timesheet;

const RECORD_COLUMNS: &str = r#"
    id,
    user_id,
    check_in_time,
    check_out_time,
    total_hours,
    created_at
"#;

/// Storage for attendance records and their break intervals. All state
/// transitions run inside a transaction so the "at most one open record per
/// user" / "at most one open break per record" invariants hold under
/// concurrent requests; the partial unique indexes in the schema back the
/// same invariants at the storage level.
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a new attendance record for the user.
    pub async fn check_in(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let open = Self::find_open_record(&mut tx, user_id).await?;
        if open.is_some() {
            return Err(AppError::AlreadyCheckedIn);
        }

        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            INSERT INTO
                attendance_records (id, user_id, check_in_time, check_out_time, total_hours, created_at)
            VALUES
                (?, ?, ?, NULL, NULL, ?)
            RETURNING {RECORD_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match err {
            // A concurrent check-in that slipped past the pre-check trips the
            // partial unique index instead.
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::AlreadyCheckedIn
            }
            other => AppError::from(other),
        })?;

        tx.commit().await?;

        Ok(record)
    }

    /// Close the user's open attendance record, persisting the elapsed hours
    /// computed at this instant.
    pub async fn check_out(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let open = Self::find_open_record(&mut tx, user_id)
            .await?
            .ok_or(AppError::NoActiveAttendance)?;

        let total_hours = timesheet::total_hours(open.check_in_time, Some(now))
            .map(timesheet::round_hours);

        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            UPDATE attendance_records
            SET
                check_out_time = ?,
                total_hours = ?
            WHERE
                id = ?
            RETURNING {RECORD_COLUMNS}
            "#,
        ))
        .bind(now)
        .bind(total_hours)
        .bind(&open.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Start a break under the user's open attendance record.
    pub async fn start_break(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<BreakInterval, AppError> {
        let mut tx = self.pool.begin().await?;

        let open = Self::find_open_record(&mut tx, user_id)
            .await?
            .ok_or(AppError::NoActiveAttendance)?;

        if Self::find_open_break(&mut tx, &open.id).await?.is_some() {
            return Err(AppError::BreakAlreadyActive);
        }

        let interval = sqlx::query_as::<_, BreakInterval>(
            r#"
            INSERT INTO
                break_intervals (id, attendance_record_id, start_time, end_time)
            VALUES
                (?, ?, ?, NULL)
            RETURNING
                id,
                attendance_record_id,
                start_time,
                end_time
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&open.id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::BreakAlreadyActive
            }
            other => AppError::from(other),
        })?;

        tx.commit().await?;

        Ok(interval)
    }

    /// End the open break under the user's open attendance record.
    pub async fn end_break(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<BreakInterval, AppError> {
        let mut tx = self.pool.begin().await?;

        let open = Self::find_open_record(&mut tx, user_id)
            .await?
            .ok_or(AppError::NoActiveAttendance)?;

        let open_break = Self::find_open_break(&mut tx, &open.id)
            .await?
            .ok_or(AppError::NoActiveBreak)?;

        let interval = sqlx::query_as::<_, BreakInterval>(
            r#"
            UPDATE break_intervals
            SET
                end_time = ?
            WHERE
                id = ?
            RETURNING
                id,
                attendance_record_id,
                start_time,
                end_time
            "#,
        )
        .bind(now)
        .bind(&open_break.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(interval)
    }

    /// All records (newest first), each with its breaks, optionally filtered
    /// to one user.
    pub async fn list_records(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<AttendanceRecordWithBreaks>, AppError> {
        let records = match user_id {
            Some(uid) => {
                sqlx::query_as::<_, AttendanceRecord>(&format!(
                    r#"
                    SELECT {RECORD_COLUMNS}
                    FROM attendance_records
                    WHERE user_id = ?
                    ORDER BY check_in_time DESC
                    "#,
                ))
                .bind(uid)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AttendanceRecord>(&format!(
                    r#"
                    SELECT {RECORD_COLUMNS}
                    FROM attendance_records
                    ORDER BY check_in_time DESC
                    "#,
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut result = Vec::with_capacity(records.len());
        for record in records {
            let breaks = self.breaks_for_record(&record.id).await?;
            result.push(AttendanceRecordWithBreaks { record, breaks });
        }

        Ok(result)
    }

    pub async fn breaks_for_record(&self, record_id: &str) -> Result<Vec<BreakInterval>, AppError> {
        let breaks = sqlx::query_as::<_, BreakInterval>(
            r#"
            SELECT
                id,
                attendance_record_id,
                start_time,
                end_time
            FROM
                break_intervals
            WHERE
                attendance_record_id = ?
            ORDER BY
                start_time ASC
            "#,
        )
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(breaks)
    }

    /// Most recent open record for the user, if any. Ties on the open-record
    /// invariant are broken by latest check-in time.
    async fn find_open_record(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        user_id: &str,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM attendance_records
            WHERE user_id = ? AND check_out_time IS NULL
            ORDER BY check_in_time DESC
            LIMIT 1
            "#,
        ))
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(record)
    }

    async fn find_open_break(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        record_id: &str,
    ) -> Result<Option<BreakInterval>, AppError> {
        let interval = sqlx::query_as::<_, BreakInterval>(
            r#"
            SELECT
                id,
                attendance_record_id,
                start_time,
                end_time
            FROM
                break_intervals
            WHERE
                attendance_record_id = ? AND end_time IS NULL
            ORDER BY
                start_time DESC
            LIMIT 1
            "#,
        )
        .bind(record_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(interval)
    }
}
