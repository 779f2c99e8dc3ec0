use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::attendance::AttendanceService;
use crate::services::auth::Claims;

/// Body of every attendance transition: the scanned QR code. The acting
/// user comes from the session token, never from the request body.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: Option<String>,
}

pub async fn check_in(
    claims: Claims,
    service: web::Data<AttendanceService>,
    input: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    let record = service.check_in(claims.user_id(), &input.code).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        Some(record),
        "Checked in",
    )))
}

pub async fn check_out(
    claims: Claims,
    service: web::Data<AttendanceService>,
    input: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    let record = service.check_out(claims.user_id(), &input.code).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(record),
        "Checked out",
    )))
}

pub async fn start_break(
    claims: Claims,
    service: web::Data<AttendanceService>,
    input: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    let interval = service.start_break(claims.user_id(), &input.code).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        Some(interval),
        "Break started",
    )))
}

pub async fn end_break(
    claims: Claims,
    service: web::Data<AttendanceService>,
    input: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    let interval = service.end_break(claims.user_id(), &input.code).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(interval),
        "Break ended",
    )))
}

/// Attendance history with derived hour metrics. Employees always get their
/// own history; admins can ask for one user's or everyone's.
pub async fn history(
    claims: Claims,
    service: web::Data<AttendanceService>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = if claims.is_admin() {
        query.user_id.as_deref()
    } else {
        Some(claims.user_id())
    };

    let entries = service.history(filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
}
