use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;

use super::{CreatedResponse, MessageResponse};
use crate::config::DEFAULT_USER_ROLE;
use crate::error::ApiError;
use crate::model::User;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct UserInput {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

pub async fn list_users(State(state): State<SharedState>) -> Json<Vec<User>> {
    match state.db.list_users() {
        Ok(users) => Json(users),
        Err(e) => {
            tracing::error!("Failed to list users: {}", e);
            Json(Vec::new())
        }
    }
}

pub async fn create_user(
    State(state): State<SharedState>,
    Json(input): Json<UserInput>,
) -> Result<Json<CreatedResponse>, ApiError> {
    if input.username.trim().is_empty() || input.email.trim().is_empty() {
        return Err(ApiError::Validation(
            "username and email are required".to_string(),
        ));
    }
    if state.db.find_user_by_username(&input.username)?.is_some() {
        return Err(ApiError::Duplicate("username"));
    }
    if state.db.find_user_by_email(&input.email)?.is_some() {
        return Err(ApiError::Duplicate("email"));
    }

    let user = User {
        id: 0,
        username: input.username,
        email: input.email,
        role: input.role.unwrap_or_else(|| DEFAULT_USER_ROLE.to_string()),
        is_active: input.is_active.unwrap_or(true),
        created_at: Utc::now().to_rfc3339(),
        last_login: None,
    };
    let id = state.db.insert_user(&user)?;
    Ok(Json(CreatedResponse {
        ok: true,
        message: format!("User '{}' created", user.username),
        id,
    }))
}

pub async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(input): Json<UserInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing = state.db.get_user(id)?.ok_or(ApiError::NotFound("User"))?;

    // Uniqueness still holds when renaming onto someone else's identity.
    if let Some(other) = state.db.find_user_by_username(&input.username)? {
        if other.id != id {
            return Err(ApiError::Duplicate("username"));
        }
    }
    if let Some(other) = state.db.find_user_by_email(&input.email)? {
        if other.id != id {
            return Err(ApiError::Duplicate("email"));
        }
    }

    let user = User {
        username: input.username,
        email: input.email,
        role: input.role.unwrap_or(existing.role.clone()),
        is_active: input.is_active.unwrap_or(existing.is_active),
        ..existing
    };
    if state.db.update_user(id, &user)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "User updated".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("User"))
    }
}

pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.db.delete_user(id)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "User deleted".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("User"))
    }
}
