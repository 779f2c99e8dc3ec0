use actix_web::{HttpResponse, web};

use crate::database::repositories::StatsRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// Dashboard counters (admins only).
pub async fn get_statistics(
    claims: Claims,
    repo: web::Data<StatsRepository>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can view statistics".to_string(),
        ));
    }

    let statistics = repo.get_admin_statistics().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(statistics)))
}
