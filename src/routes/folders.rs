use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{CreatedResponse, MessageResponse};
use crate::error::ApiError;
use crate::folder_tree::{self, scope, FolderNode, FolderRow, FolderType};
use crate::state::SharedState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FolderInput {
    pub name: String,
    pub folder_type: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub deployment_date: Option<String>,
    #[serde(default)]
    pub parent_folder_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureFoldersInput {
    pub parent_folder_id: i64,
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScopeResponse {
    pub folder_id: i64,
    /// false when the id could not be scoped (vanished or a leaf) and the
    /// console should show the unfiltered collection.
    pub scoped: bool,
    pub folder_ids: Vec<i64>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_folders(State(state): State<SharedState>) -> Json<Vec<FolderRow>> {
    match state.db.list_folders() {
        Ok(folders) => Json(folders),
        Err(e) => {
            tracing::error!("Failed to list folders: {}", e);
            Json(Vec::new())
        }
    }
}

pub async fn folder_tree(State(state): State<SharedState>) -> Json<Vec<FolderNode>> {
    let folders = match state.db.list_folders() {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Failed to load folders for tree: {}", e);
            return Json(Vec::new());
        }
    };
    let cases = match state.db.list_test_cases() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load test cases for tree: {}", e);
            Vec::new()
        }
    };
    Json(folder_tree::build_tree_with_cases(&folders, &cases))
}

pub async fn folder_scope(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Json<ScopeResponse> {
    let folders = match state.db.list_folders() {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Failed to load folders for scope: {}", e);
            return Json(ScopeResponse {
                folder_id: id,
                scoped: false,
                folder_ids: Vec::new(),
            });
        }
    };
    let tree = folder_tree::build_tree(&folders);
    match scope::resolve_selection_scope(&tree, id) {
        Some(ids) => {
            let mut folder_ids: Vec<i64> = ids.into_iter().collect();
            folder_ids.sort_unstable();
            Json(ScopeResponse {
                folder_id: id,
                scoped: true,
                folder_ids,
            })
        }
        None => {
            tracing::warn!("Scope requested for unknown folder {}", id);
            Json(ScopeResponse {
                folder_id: id,
                scoped: false,
                folder_ids: Vec::new(),
            })
        }
    }
}

pub async fn create_folder(
    State(state): State<SharedState>,
    Json(input): Json<FolderInput>,
) -> Result<Json<CreatedResponse>, ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::Validation("Folder name is required".to_string()));
    }
    let folder_type = parse_folder_type(&input.folder_type)?;
    validate_nesting(&state, folder_type, input.parent_folder_id)?;

    let row = FolderRow {
        id: 0,
        name: input.name,
        folder_type: folder_type.as_str().to_string(),
        environment: input.environment,
        deployment_date: input.deployment_date,
        parent_folder_id: input.parent_folder_id,
        created_at: Utc::now().to_rfc3339(),
    };
    let id = state.db.insert_folder(&row)?;
    Ok(Json(CreatedResponse {
        ok: true,
        message: "Folder created".to_string(),
        id,
    }))
}

pub async fn update_folder(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(input): Json<FolderInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing = state.db.get_folder(id)?.ok_or(ApiError::NotFound("Folder"))?;
    let folder_type = parse_folder_type(&input.folder_type)?;
    validate_nesting(&state, folder_type, input.parent_folder_id)?;

    // Re-parenting onto itself or a descendant would introduce a cycle.
    if let Some(new_parent) = input.parent_folder_id {
        if new_parent == id {
            return Err(ApiError::InvalidNesting(
                "folder cannot be its own parent".to_string(),
            ));
        }
        let folders = state.db.list_folders()?;
        let tree = folder_tree::build_tree(&folders);
        if let Some(node) = scope::find_folder_in_tree(&tree, id) {
            if subtree_contains(node, new_parent) {
                return Err(ApiError::InvalidNesting(
                    "folder cannot be moved under its own descendant".to_string(),
                ));
            }
        }
    }

    let row = FolderRow {
        folder_type: folder_type.as_str().to_string(),
        name: input.name,
        environment: input.environment,
        deployment_date: input.deployment_date,
        parent_folder_id: input.parent_folder_id,
        ..existing
    };
    if state.db.update_folder(id, &row)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "Folder updated".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Folder"))
    }
}

pub async fn delete_folder(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.db.delete_folder(id)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "Folder deleted".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Folder"))
    }
}

/// Bulk-create feature folders under a deployment-date folder.
pub async fn add_feature_folders(
    State(state): State<SharedState>,
    Json(input): Json<FeatureFoldersInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let parent = state
        .db
        .get_folder(input.parent_folder_id)?
        .ok_or(ApiError::NotFound("Parent folder"))?;
    if parent.folder_type != FolderType::DeploymentDate.as_str() {
        return Err(ApiError::InvalidNesting(
            "feature folders must be created under a deployment_date folder".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let mut created = 0usize;
    for name in input.names.iter().filter(|n| !n.trim().is_empty()) {
        let row = FolderRow {
            id: 0,
            name: name.clone(),
            folder_type: FolderType::Feature.as_str().to_string(),
            environment: parent.environment.clone(),
            deployment_date: parent.deployment_date.clone(),
            parent_folder_id: Some(parent.id),
            created_at: now.clone(),
        };
        state.db.insert_folder(&row)?;
        created += 1;
    }

    Ok(Json(MessageResponse {
        ok: true,
        message: format!("{} feature folders created", created),
    }))
}

// ============================================================================
// Validation helpers
// ============================================================================

fn parse_folder_type(raw: &str) -> Result<FolderType, ApiError> {
    match FolderType::parse(raw) {
        Some(FolderType::TestCase) | None => Err(ApiError::Validation(format!(
            "unknown folder type '{}'",
            raw
        ))),
        Some(t) => Ok(t),
    }
}

fn validate_nesting(
    state: &SharedState,
    folder_type: FolderType,
    parent_id: Option<i64>,
) -> Result<(), ApiError> {
    match parent_id {
        None => {
            if folder_type != FolderType::Environment {
                return Err(ApiError::InvalidNesting(format!(
                    "{} folders need a parent folder",
                    folder_type.as_str()
                )));
            }
        }
        Some(pid) => {
            let parent = state
                .db
                .get_folder(pid)
                .map_err(ApiError::Db)?
                .ok_or(ApiError::NotFound("Parent folder"))?;
            let parent_type = FolderType::parse(&parent.folder_type)
                .unwrap_or(FolderType::Environment);
            if !parent_type.allows_child(folder_type) {
                return Err(ApiError::InvalidNesting(format!(
                    "{} folders cannot contain {} folders",
                    parent_type.as_str(),
                    folder_type.as_str()
                )));
            }
        }
    }
    Ok(())
}

fn subtree_contains(node: &FolderNode, id: i64) -> bool {
    scope::find_folder_in_tree(std::slice::from_ref(node), id).is_some()
}
