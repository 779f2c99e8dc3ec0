use actix_web::{HttpResponse, web};
use bcrypt::{DEFAULT_COST, hash};

use crate::database::models::{CreateUserRequest, UpdateUserRequest, User, UserInfo};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// List all users (admins only).
pub async fn get_users(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can list users".to_string(),
        ));
    }

    let users: Vec<UserInfo> = user_repo
        .get_all_users()
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

/// Create a user with an explicit role (admins only). Registration handles
/// the self-service path; this one exists so admins can onboard staff.
pub async fn create_user(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
    input: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can create users".to_string(),
        ));
    }

    let request = input.into_inner();

    if user_repo.email_exists(&request.email).await? {
        return Err(AppError::DuplicateEmail(request.email));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)?;
    let user = user_repo
        .create_user(&User::new(request, password_hash))
        .await?;

    log::info!("Admin {} created user {}", claims.user_id(), user.email);
    Ok(HttpResponse::Created().json(ApiResponse::success(UserInfo::from(user))))
}

/// Update a user's profile and role (admins only).
pub async fn update_user(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
    path: web::Path<String>,
    input: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can update users".to_string(),
        ));
    }

    let user_id = path.into_inner();
    let user = user_repo.update_user(&user_id, &input.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}
