use actix_web::{
    Error as ActixError, FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized,
    web::Data,
};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};

use crate::config::Config;
use crate::database::models::{CreateUserRequest, LoginRequest, LoginResponse, User, UserRole};
use crate::database::repositories::UserRepository;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: UserRole,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(auth_header) = auth_header {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    // Get the config from app data
                    if let Some(config) = req.app_data::<Data<Config>>() {
                        return match decode::<Claims>(
                            token,
                            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
                            &Validation::new(Algorithm::HS256),
                        ) {
                            Ok(token_data) => ready(Ok(token_data.claims)),
                            Err(_) => ready(Err(ErrorUnauthorized("Invalid token"))),
                        };
                    }
                }
            }
        }

        ready(Err(ErrorUnauthorized(
            "Missing or invalid authorization header",
        )))
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repository: UserRepository,
    config: Config,
}

impl AuthService {
    pub fn new(user_repository: UserRepository, config: Config) -> Self {
        Self {
            user_repository,
            config,
        }
    }

    /// Register a new account. The very first account becomes the admin;
    /// everyone after that registers as an employee unless an admin sets the
    /// role explicitly through user administration.
    pub async fn register(&self, mut request: CreateUserRequest) -> Result<LoginResponse, AppError> {
        if self.user_repository.email_exists(&request.email).await? {
            return Err(AppError::DuplicateEmail(request.email));
        }

        let role = if self.user_repository.count_users().await? == 0 {
            UserRole::Admin
        } else {
            UserRole::Employee
        };
        request.role = Some(role);

        let password_hash = hash(&request.password, DEFAULT_COST)?;
        let user = User::new(request, password_hash);
        let user = self.user_repository.create_user(&user).await?;

        let token = self.generate_token(&user)?;

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify(&request.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.generate_token(&user)?;

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    pub fn generate_token(&self, user: &User) -> Result<String, AppError> {
        let expiration = Utc::now() + Duration::days(self.config.jwt_expiration_days);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            exp: expiration.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;

        Ok(token)
    }
}
