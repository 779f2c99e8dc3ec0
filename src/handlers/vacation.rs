use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::database::models::{ResolutionRequest, VacationRequestInput, VacationStatus};
use crate::database::repositories::VacationRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
}

/// Create a vacation request for the authenticated user; it starts pending.
pub async fn create_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    input: web::Json<VacationRequestInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();

    if input.end_date < input.start_date {
        return Err(AppError::BadRequest(
            "End date must not precede start date".to_string(),
        ));
    }

    let request = repo.create_request(claims.user_id(), input).await?;

    log::info!(
        "User {} requested vacation {} - {}",
        claims.user_id(),
        request.start_date,
        request.end_date
    );
    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

/// List vacation requests. Employees see their own; admins can filter by
/// user and status.
pub async fn get_requests(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    query: web::Query<VacationQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = if claims.is_admin() {
        query.user_id.as_deref()
    } else {
        Some(claims.user_id())
    };

    let status = match &query.status {
        Some(status_str) => Some(
            status_str
                .parse::<VacationStatus>()
                .map_err(AppError::BadRequest)?,
        ),
        None => None,
    };

    let requests = repo.get_requests(user_id, status).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

/// Fetch one request; visible to its owner and to admins.
pub async fn get_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let request_id = path.into_inner();

    let request = repo
        .get_request_by_id(&request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vacation request {} not found", request_id)))?;

    if !claims.is_admin() && request.user_id != claims.user_id() {
        return Err(AppError::Forbidden(
            "Cannot view other users' requests".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Approve a pending request (admins only). Approval is terminal.
pub async fn approve_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    path: web::Path<String>,
    input: web::Json<ResolutionRequest>,
) -> Result<HttpResponse, AppError> {
    resolve(claims, repo, path, input, VacationStatus::Approved).await
}

/// Reject a pending request (admins only). Rejection is terminal.
pub async fn reject_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    path: web::Path<String>,
    input: web::Json<ResolutionRequest>,
) -> Result<HttpResponse, AppError> {
    resolve(claims, repo, path, input, VacationStatus::Rejected).await
}

async fn resolve(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    path: web::Path<String>,
    input: web::Json<ResolutionRequest>,
    status: VacationStatus,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can resolve vacation requests".to_string(),
        ));
    }

    let request_id = path.into_inner();
    let request = repo
        .resolve_request(
            &request_id,
            status.clone(),
            claims.user_id(),
            input.into_inner().note,
        )
        .await?;

    log::info!(
        "Admin {} marked vacation request {} as {}",
        claims.user_id(),
        request_id,
        status
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}
