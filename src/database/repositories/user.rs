use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::{UpdateUserRequest, User};
use crate::error::AppError;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user. A unique-constraint violation on the email column
    /// is reported as a duplicate-email error.
    pub async fn create_user(&self, user: &User) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO
                users (
                    id,
                    first_name,
                    last_name,
                    email,
                    phone,
                    work_location,
                    role,
                    password_hash,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                first_name,
                last_name,
                email,
                phone,
                work_location,
                role,
                password_hash,
                created_at,
                updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.work_location)
        .bind(&user.role)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEmail(user.email.clone())
            }
            other => AppError::from(other),
        })?;

        Ok(created)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id,
                first_name,
                last_name,
                email,
                phone,
                work_location,
                role,
                password_hash,
                created_at,
                updated_at
            FROM
                users
            WHERE
                email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id,
                first_name,
                last_name,
                email,
                phone,
                work_location,
                role,
                password_hash,
                created_at,
                updated_at
            FROM
                users
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id,
                first_name,
                last_name,
                email,
                phone,
                work_location,
                role,
                password_hash,
                created_at,
                updated_at
            FROM
                users
            ORDER BY
                first_name ASC,
                last_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn update_user(
        &self,
        id: &str,
        input: &UpdateUserRequest,
    ) -> Result<User, AppError> {
        let updated_at = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                first_name = ?,
                last_name = ?,
                phone = ?,
                work_location = ?,
                role = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                id,
                first_name,
                last_name,
                email,
                phone,
                work_location,
                role,
                password_hash,
                created_at,
                updated_at
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .bind(&input.work_location)
        .bind(&input.role)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        Ok(user)
    }
}
