use std::sync::Arc;

use actix_web::{http::StatusCode, test};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

use timeclock_be::AppError;
use timeclock_be::database::repositories::QrTokenRepository;
use timeclock_be::services::{FixedClock, QrService};

mod common;

use common::{TestApp, bearer};

#[actix_web::test]
#[serial]
async fn current_token_is_minted_lazily_for_admins() {
    let ctx = TestApp::new().await.unwrap();
    let app = test::init_service(ctx.create_app()).await;
    let admin = ctx.register_user("admin@example.com").await.unwrap();

    // No token exists yet; the endpoint mints one on demand
    let req = test::TestRequest::get()
        .uri("/api/v1/qr/current")
        .insert_header(bearer(&admin.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let code = body["data"]["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 64);

    // A second read returns the same token while it is still valid
    let req = test::TestRequest::get()
        .uri("/api/v1/qr/current")
        .insert_header(bearer(&admin.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["code"].as_str().unwrap(), code);
}

#[actix_web::test]
#[serial]
async fn current_token_is_admin_only() {
    let ctx = TestApp::new().await.unwrap();
    let app = test::init_service(ctx.create_app()).await;
    let _admin = ctx.register_user("admin@example.com").await.unwrap();
    let worker = ctx.register_user("worker@example.com").await.unwrap();

    let req = test::TestRequest::get()
        .uri("/api/v1/qr/current")
        .insert_header(bearer(&worker.token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
#[serial]
async fn generate_replaces_the_current_token() {
    let ctx = TestApp::new().await.unwrap();
    let app = test::init_service(ctx.create_app()).await;
    let admin = ctx.register_user("admin@example.com").await.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/qr/generate")
        .insert_header(bearer(&admin.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let first = body["data"]["code"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/qr/generate")
        .insert_header(bearer(&admin.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let second = body["data"]["code"].as_str().unwrap().to_string();

    assert_ne!(first, second);

    // The newest token is the one handed out as current
    let req = test::TestRequest::get()
        .uri("/api/v1/qr/current")
        .insert_header(bearer(&admin.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["code"].as_str().unwrap(), second);
}

#[actix_web::test]
#[serial]
async fn validate_accepts_a_live_code() {
    let ctx = TestApp::new().await.unwrap();
    let app = test::init_service(ctx.create_app()).await;
    let session = ctx.register_user("worker@example.com").await.unwrap();
    let code = ctx.valid_qr_code().await.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/qr/validate")
        .insert_header(bearer(&session.token))
        .set_json(json!({ "code": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["code"].as_str().unwrap(), code);
}

#[actix_web::test]
#[serial]
async fn token_expires_exactly_at_the_scheduled_boundary() {
    let ctx = TestApp::new().await.unwrap();
    let repo = QrTokenRepository::new(ctx.pool.clone());
    let tz = ctx.config.qr_timezone();

    let at = |h: u32, m: u32| {
        tz.with_ymd_and_hms(2025, 6, 3, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    };

    // Minted in the morning slot: valid until 15:00 local
    let minted = QrService::new(repo.clone(), Arc::new(FixedClock(at(14, 30))), tz);
    let token = minted.generate().await.unwrap();
    assert_eq!(token.valid_until, at(15, 0));
    assert!(token.is_valid_at(at(14, 59)));
    assert!(!token.is_valid_at(at(15, 0)));

    // Still accepted one minute before the boundary
    let before = QrService::new(repo.clone(), Arc::new(FixedClock(at(14, 59))), tz);
    before.validate(&token.code).await.unwrap();

    // The window is half-open: exactly 15:00 is already outside it
    let at_boundary = QrService::new(repo, Arc::new(FixedClock(at(15, 0))), tz);
    let err = at_boundary.validate(&token.code).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidOrExpiredToken));
}

#[actix_web::test]
#[serial]
async fn validate_rejects_expired_and_unknown_codes() {
    let ctx = TestApp::new().await.unwrap();
    let app = test::init_service(ctx.create_app()).await;
    let session = ctx.register_user("worker@example.com").await.unwrap();
    let expired = ctx.expired_qr_code().await.unwrap();

    for code in [expired.as_str(), "no-such-code"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/qr/validate")
            .insert_header(bearer(&session.token))
            .set_json(json!({ "code": code }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], json!("INVALID_OR_EXPIRED_TOKEN"));
    }
}
