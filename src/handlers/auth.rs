use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::database::models::{CreateUserRequest, LoginRequest, UserInfo};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// Register a new account and return a session token.
pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.register(input.into_inner()).await?;

    log::info!("Registered user {}", response.user.email);
    Ok(HttpResponse::Created().json(ApiResponse::success(response)))
}

/// Exchange credentials for a session token.
pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.login(input.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Profile of the authenticated user.
pub async fn me(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
) -> Result<HttpResponse, AppError> {
    let user = user_repo
        .find_by_id(claims.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}
