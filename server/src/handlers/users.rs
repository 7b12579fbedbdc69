use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::required;
use crate::models::{new_id, NewUser, UserProfile, UserType};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub user_type: Option<String>,
    pub full_name: Option<String>,
    pub nik: Option<String>,
    pub organization_name: Option<String>,
    pub npwp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Registered {
    user_id: String,
    user_type: UserType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoggedIn {
    user_id: String,
    email: String,
    user_type: String,
    full_name: Option<String>,
}

pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;

    let email = required(req.email, "email")?;
    let password_hash = required(req.password_hash, "passwordHash")?;
    let user_type: UserType = required(req.user_type, "userType")?
        .parse()
        .map_err(AppError::ValidationError)?;

    let user = state
        .store
        .create_user(NewUser {
            id: new_id("user"),
            email,
            password_hash,
            user_type,
            full_name: req.full_name,
            nik: req.nik,
            organization_name: req.organization_name,
            npwp: req.npwp,
        })
        .await?;

    info!(user_id = %user.id, %user_type, "User registered");

    Ok(created(
        Registered {
            user_id: user.id,
            user_type,
        },
        "Registration successful",
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;

    let email = required(req.email, "email")?;
    let password_hash = required(req.password_hash, "passwordHash")?;

    // Hashes are produced client side; the server only compares them.
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .filter(|user| user.password_hash == password_hash)
        .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

    let full_name = user.display_name();
    Ok(success(
        LoggedIn {
            user_id: user.id,
            email: user.email,
            user_type: user.user_type,
            full_name,
        },
        "Login successful",
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .store
        .find_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(user)))
}
