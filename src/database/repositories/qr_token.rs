use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::database::models::QrToken;
use crate::error::AppError;

#[derive(Clone)]
pub struct QrTokenRepository {
    pool: SqlitePool,
}

impl QrTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, token: &QrToken) -> Result<QrToken, AppError> {
        let token = sqlx::query_as::<_, QrToken>(
            r#"
            INSERT INTO
                qr_tokens (id, code, generated_at, valid_until)
            VALUES
                (?, ?, ?, ?)
            RETURNING
                id,
                code,
                generated_at,
                valid_until
            "#,
        )
        .bind(&token.id)
        .bind(&token.code)
        .bind(token.generated_at)
        .bind(token.valid_until)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    /// Newest token that is still valid at `now`, if any.
    pub async fn find_active(&self, now: DateTime<Utc>) -> Result<Option<QrToken>, AppError> {
        let token = sqlx::query_as::<_, QrToken>(
            r#"
            SELECT
                id,
                code,
                generated_at,
                valid_until
            FROM
                qr_tokens
            WHERE
                valid_until > ?
            ORDER BY
                generated_at DESC
            LIMIT 1
            "#,
        )
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    /// Look up a code, accepting it only while `now < valid_until`.
    pub async fn find_valid(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<QrToken>, AppError> {
        let token = sqlx::query_as::<_, QrToken>(
            r#"
            SELECT
                id,
                code,
                generated_at,
                valid_until
            FROM
                qr_tokens
            WHERE
                code = ?
                AND valid_until > ?
            "#,
        )
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    /// Drop tokens whose validity window has passed.
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM qr_tokens WHERE valid_until < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
