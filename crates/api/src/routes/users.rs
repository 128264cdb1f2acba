//! User route handlers.
//!
//! Passwords are hashed before anything is stored and never appear in
//! responses. An update always rewrites the hash: leaving `password` out
//! hashes the empty string.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use utoipa::ToSchema;

use catalog_core::{Email, UserId};

use crate::error::{AppError, ErrorResponse, Result};
use crate::models::{User, UserRecord};
use crate::routes::{StatusMessage, parse_id};
use crate::services::password::hash_password;
use crate::state::AppState;

const NOT_FOUND: &str = "the user with the given ID was not found";

fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND.to_string())
}

/// JSON body for creating or replacing a user.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[schema(example = "Ada")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Plaintext password; hashed before storage.
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// A user request that passed validation, password still in plaintext.
struct UserInput {
    name: String,
    email: Email,
    password: String,
    is_admin: bool,
}

impl UserRequest {
    fn validate(self, password_required: bool) -> Result<UserInput> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        let email =
            Email::parse(&self.email).map_err(|e| AppError::BadRequest(format!("email: {e}")))?;
        let password = match self.password {
            Some(password) => password,
            None if password_required => {
                return Err(AppError::BadRequest("password is required".to_string()));
            }
            None => String::new(),
        };

        Ok(UserInput {
            name: name.to_string(),
            email,
            password,
            is_admin: self.is_admin,
        })
    }
}

impl UserInput {
    /// Hash the password off the async runtime.
    async fn into_record(self) -> Result<UserRecord> {
        let password = self.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))??;

        Ok(UserRecord {
            name: self.name,
            email: self.email,
            password_hash,
            is_admin: self.is_admin,
        })
    }
}

/// List every user.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 400, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = state.store().list_users().await.map_err(AppError::query)?;
    Ok(Json(users))
}

/// Get one user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 400, description = "Malformed id or storage error", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let id: UserId = parse_id(&id, "user")?;
    let user = state
        .store()
        .get_user(id)
        .await
        .map_err(AppError::query)?
        .ok_or_else(not_found)?;
    Ok(Json(user))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = UserRequest,
    responses(
        (status = 200, description = "The created user", body = User),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Storage or hashing error", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    body: std::result::Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let Json(body) = body?;
    let record = body.validate(true)?.into_record().await?;

    let user = state.store().create_user(&record).await?;
    tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User created");
    Ok(Json(user))
}

/// Replace every field of a user.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "The updated user", body = User),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 500, description = "Storage or hashing error", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let id: UserId = parse_id(&id, "user")?;
    let Json(body) = body?;
    let record = body.validate(false)?.into_record().await?;

    let user = state
        .store()
        .replace_user(id, &record)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(user))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = StatusMessage),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusMessage>> {
    let id: UserId = parse_id(&id, "user")?;
    if !state.store().delete_user(id).await? {
        return Err(not_found());
    }
    Ok(StatusMessage::ok("the user is deleted"))
}
