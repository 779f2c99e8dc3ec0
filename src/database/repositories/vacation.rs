use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{VacationRequest, VacationRequestInput, VacationStatus};
use crate::error::AppError;

const REQUEST_COLUMNS: &str = r#"
    id,
    user_id,
    start_date,
    end_date,
    employee_note,
    admin_note,
    status,
    resolved_by,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct VacationRepository {
    pool: SqlitePool,
}

impl VacationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new request; requests always start out pending.
    pub async fn create_request(
        &self,
        user_id: &str,
        input: VacationRequestInput,
    ) -> Result<VacationRequest, AppError> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, VacationRequest>(&format!(
            r#"
            INSERT INTO
                vacation_requests (
                    id,
                    user_id,
                    start_date,
                    end_date,
                    employee_note,
                    admin_note,
                    status,
                    resolved_by,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, NULL, ?, NULL, ?, ?)
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.employee_note)
        .bind(VacationStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// List requests (newest first), optionally filtered by user and status.
    pub async fn get_requests(
        &self,
        user_id: Option<&str>,
        status: Option<VacationStatus>,
    ) -> Result<Vec<VacationRequest>, AppError> {
        let mut query = format!("SELECT {REQUEST_COLUMNS} FROM vacation_requests");

        let mut conditions = vec![];
        if user_id.is_some() {
            conditions.push("user_id = ?");
        }
        if status.is_some() {
            conditions.push("status = ?");
        }
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut prepared = sqlx::query_as::<_, VacationRequest>(&query);
        if let Some(uid) = user_id {
            prepared = prepared.bind(uid.to_string());
        }
        if let Some(s) = status {
            prepared = prepared.bind(s);
        }

        let requests = prepared.fetch_all(&self.pool).await?;

        Ok(requests)
    }

    pub async fn get_request_by_id(&self, id: &str) -> Result<Option<VacationRequest>, AppError> {
        let request = sqlx::query_as::<_, VacationRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM vacation_requests
            WHERE id = ?
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Move a pending request to a terminal status. The pending guard lives
    /// in the WHERE clause, so a second resolution attempt matches no row and
    /// the stored status never reverts.
    pub async fn resolve_request(
        &self,
        id: &str,
        status: VacationStatus,
        resolved_by: &str,
        admin_note: Option<String>,
    ) -> Result<VacationRequest, AppError> {
        let now = Utc::now();

        let resolved = sqlx::query_as::<_, VacationRequest>(&format!(
            r#"
            UPDATE vacation_requests
            SET
                status = ?,
                resolved_by = ?,
                admin_note = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(status)
        .bind(resolved_by)
        .bind(admin_note)
        .bind(now)
        .bind(id)
        .bind(VacationStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        match resolved {
            Some(request) => Ok(request),
            None => {
                // Distinguish "no such request" from "already resolved".
                match self.get_request_by_id(id).await? {
                    Some(_) => Err(AppError::RequestAlreadyResolved),
                    None => Err(AppError::NotFound(format!(
                        "Vacation request {} not found",
                        id
                    ))),
                }
            }
        }
    }
}
