use actix_web::{HttpResponse, web};

use crate::database::models::ValidateQrRequest;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::qr::QrService;

/// Currently valid token for display at the entrance, minting one lazily if
/// none is valid (admins only).
pub async fn current(
    claims: Claims,
    service: web::Data<QrService>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can read the current QR token".to_string(),
        ));
    }

    let token = service.current().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(token)))
}

/// Force a fresh token (admins only).
pub async fn generate(
    claims: Claims,
    service: web::Data<QrService>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can generate QR tokens".to_string(),
        ));
    }

    let token = service.generate().await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(token)))
}

/// Check a scanned code without performing any transition. The scanner UI
/// calls this to give feedback before offering check-in/check-out actions.
pub async fn validate(
    _claims: Claims,
    service: web::Data<QrService>,
    input: web::Json<ValidateQrRequest>,
) -> Result<HttpResponse, AppError> {
    let token = service.validate(&input.code).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(token)))
}
