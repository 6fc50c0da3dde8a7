//! Authentication Handlers
//!
//! Handles account registration, login and current-user lookup

use std::time::Duration;

use axum::{Extension, Json, extract::State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult, ok};
use shared::{ApiResponse, AuthResponse, AuthUser, LoginRequest, RegisterRequest};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    if !email.contains('@') || email.len() < 3 {
        return Err(AppError::validation("A valid email address is required"));
    }
    if password.len() < 8 {
        return Err(AppError::validation(
            "Password must be at least 8 characters long",
        ));
    }
    Ok(())
}

/// POST /api/auth/register - 注册新账号并签发令牌
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    validate_credentials(&req.email, &req.password)?;

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(&req.email, &req.password, req.display_name)
        .await?;

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(&user.key(), &user.email, &user.display_name)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %user.key(), email = %user.email, "Account registered");

    Ok(ok(AuthResponse {
        user: user.to_auth_user(),
        token,
    }))
}

/// POST /api/auth/login - 邮箱密码登录
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo.find_by_email(&req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent email enumeration
    let user = match user {
        Some(u) => {
            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                tracing::warn!(email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            tracing::warn!(email = %req.email, "Login failed - account not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(&user.key(), &user.email, &user.display_name)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %user.key(), email = %user.email, "User logged in");

    Ok(ok(AuthResponse {
        user: user.to_auth_user(),
        token,
    }))
}

/// GET /api/auth/me - 当前用户信息
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<AuthUser>>> {
    // Query fresh account data; the token may outlive a deleted account
    let repo = UserRepository::new(state.get_db());
    let account = repo
        .find_by_key(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Account"))?;

    Ok(ok(account.to_auth_user()))
}
