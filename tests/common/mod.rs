use std::sync::Arc;

use actix_web::{App, web};
use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use timeclock_be::database::init_database;
use timeclock_be::database::models::{CreateUserRequest, LoginResponse, QrToken};
use timeclock_be::database::repositories::{
    AttendanceRepository, QrTokenRepository, StatsRepository, UserRepository, VacationRepository,
};
use timeclock_be::handlers::{attendance, auth, qr, stats, users, vacation};
use timeclock_be::services::{AttendanceService, QrService, SystemClock};
use timeclock_be::{AppState, AuthService, Config};

/// One isolated application instance over a throwaway SQLite database.
pub struct TestApp {
    pub pool: SqlitePool,
    pub config: Config,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        let config = Config {
            database_url,
            jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
            jwt_expiration_days: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            qr_tz_offset_hours: 2,
        };

        Ok(TestApp {
            pool,
            config,
            _temp_dir: temp_dir,
        })
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let clock = Arc::new(SystemClock);
        let user_repository = UserRepository::new(self.pool.clone());
        let attendance_repository = AttendanceRepository::new(self.pool.clone());
        let qr_token_repository = QrTokenRepository::new(self.pool.clone());
        let vacation_repository = VacationRepository::new(self.pool.clone());
        let stats_repository = StatsRepository::new(self.pool.clone());

        let auth_service = AuthService::new(user_repository.clone(), self.config.clone());
        let qr_service = QrService::new(
            qr_token_repository,
            clock.clone(),
            self.config.qr_timezone(),
        );
        let attendance_service = AttendanceService::new(
            attendance_repository,
            user_repository.clone(),
            qr_service.clone(),
            clock,
        );

        App::new()
            .app_data(web::Data::new(AppState { auth_service }))
            .app_data(web::Data::new(user_repository))
            .app_data(web::Data::new(vacation_repository))
            .app_data(web::Data::new(stats_repository))
            .app_data(web::Data::new(qr_service))
            .app_data(web::Data::new(attendance_service))
            .app_data(web::Data::new(self.config.clone()))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/attendance")
                            .route("/check-in", web::post().to(attendance::check_in))
                            .route("/check-out", web::post().to(attendance::check_out))
                            .route("/break/start", web::post().to(attendance::start_break))
                            .route("/break/end", web::post().to(attendance::end_break))
                            .route("/history", web::get().to(attendance::history)),
                    )
                    .service(
                        web::scope("/qr")
                            .route("/current", web::get().to(qr::current))
                            .route("/generate", web::post().to(qr::generate))
                            .route("/validate", web::post().to(qr::validate)),
                    )
                    .service(
                        web::scope("/vacations")
                            .route("", web::post().to(vacation::create_request))
                            .route("", web::get().to(vacation::get_requests))
                            .route("/{id}", web::get().to(vacation::get_request))
                            .route("/{id}/approve", web::post().to(vacation::approve_request))
                            .route("/{id}/reject", web::post().to(vacation::reject_request)),
                    )
                    .service(
                        web::scope("/admin")
                            .route("/users", web::get().to(users::get_users))
                            .route("/users", web::post().to(users::create_user))
                            .route("/users/{id}", web::put().to(users::update_user))
                            .route("/statistics", web::get().to(stats::get_statistics)),
                    ),
            )
    }

    /// Register an account directly through the auth service. The first
    /// account in a fresh database becomes the admin.
    pub async fn register_user(&self, email: &str) -> Result<LoginResponse> {
        let auth_service =
            AuthService::new(UserRepository::new(self.pool.clone()), self.config.clone());

        let response = auth_service
            .register(CreateUserRequest {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: email.to_string(),
                password: "password123".to_string(),
                phone: None,
                work_location: Some("Main office".to_string()),
                role: None,
            })
            .await?;

        Ok(response)
    }

    /// Insert a QR token that stays valid for another hour.
    pub async fn valid_qr_code(&self) -> Result<String> {
        self.insert_qr_token(Utc::now() + Duration::hours(1)).await
    }

    /// Insert a QR token whose validity window has already closed.
    pub async fn expired_qr_code(&self) -> Result<String> {
        self.insert_qr_token(Utc::now() - Duration::hours(1)).await
    }

    async fn insert_qr_token(&self, valid_until: chrono::DateTime<Utc>) -> Result<String> {
        let repo = QrTokenRepository::new(self.pool.clone());
        let token = QrToken {
            id: Uuid::new_v4().to_string(),
            code: Uuid::new_v4().simple().to_string(),
            generated_at: Utc::now() - Duration::minutes(5),
            valid_until,
        };
        let token = repo.insert(&token).await?;

        Ok(token.code)
    }
}

/// Bearer header tuple for test requests.
pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
