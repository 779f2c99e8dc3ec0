use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use timeclock_be::database::{
    init_database,
    repositories::{
        AttendanceRepository, QrTokenRepository, StatsRepository, UserRepository,
        VacationRepository,
    },
};
use timeclock_be::handlers::{attendance, auth, qr, stats, users, vacation};
use timeclock_be::middleware::RequestId;
use timeclock_be::services::{AttendanceService, QrService, SystemClock};
use timeclock_be::{AppState, AuthService, Config};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Timeclock API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("Starting Timeclock API server...");

    // Load configuration
    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Initialize repositories and services
    let clock = Arc::new(SystemClock);
    let user_repository = UserRepository::new(pool.clone());
    let attendance_repository = AttendanceRepository::new(pool.clone());
    let qr_token_repository = QrTokenRepository::new(pool.clone());
    let vacation_repository = VacationRepository::new(pool.clone());
    let stats_repository = StatsRepository::new(pool.clone());

    let auth_service = AuthService::new(user_repository.clone(), config.clone());
    let qr_service = QrService::new(
        qr_token_repository.clone(),
        clock.clone(),
        config.qr_timezone(),
    );
    let attendance_service = AttendanceService::new(
        attendance_repository.clone(),
        user_repository.clone(),
        qr_service.clone(),
        clock.clone(),
    );

    // Make sure a scannable token exists before the first request arrives
    if let Err(err) = qr_service.current().await {
        log::warn!("Could not seed initial QR token: {}", err);
    }

    // Create app state and repository data
    let app_state = web::Data::new(AppState { auth_service });
    let user_repo_data = web::Data::new(user_repository);
    let vacation_repo_data = web::Data::new(vacation_repository);
    let stats_repo_data = web::Data::new(stats_repository);
    let qr_service_data = web::Data::new(qr_service);
    let attendance_service_data = web::Data::new(attendance_service);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(user_repo_data.clone())
            .app_data(vacation_repo_data.clone())
            .app_data(stats_repo_data.clone())
            .app_data(qr_service_data.clone())
            .app_data(attendance_service_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_origin("http://localhost:5173")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
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
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
