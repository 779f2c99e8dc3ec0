use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::AppError;

/// Counters shown on the admin dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatistics {
    pub total_users: i64,
    pub total_admins: i64,
    pub total_employees: i64,
    pub total_attendance_records: i64,
    pub open_attendance_records: i64,
    pub pending_vacation_requests: i64,
}

#[derive(Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_admin_statistics(&self) -> Result<AdminStatistics, AppError> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let total_admins: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(&self.pool)
                .await?;

        let total_employees: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'employee'")
                .fetch_one(&self.pool)
                .await?;

        let total_attendance_records: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendance_records")
                .fetch_one(&self.pool)
                .await?;

        let open_attendance_records: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attendance_records WHERE check_out_time IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        let pending_vacation_requests: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vacation_requests WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;

        Ok(AdminStatistics {
            total_users,
            total_admins,
            total_employees,
            total_attendance_records,
            open_attendance_records,
            pending_vacation_requests,
        })
    }
}
