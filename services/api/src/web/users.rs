//! services/api/src/web/users.rs
//!
//! CRUD endpoints for user accounts plus the document-upload endpoint.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::error;
use utoipa::ToSchema;

use adoptme_core::domain::{NewUser, Role, UserDocument, UserUpdate};
use adoptme_core::ports::PortError;

use crate::uploads::{self, UploadKind};
use crate::web::dto::{UserDocumentDto, UserDto};
use crate::web::response::{self, ApiFailure};
use crate::web::state::AppState;
use crate::web::parse_id;

/// Most documents a single upload request may carry.
const MAX_DOCUMENTS_PER_UPLOAD: usize = 5;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/users - List all users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [UserDto]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiFailure> {
    let users = state.db.list_users().await.map_err(|e| {
        error!("Failed to list users: {:?}", e);
        ApiFailure::internal("Failed to retrieve users")
    })?;

    let payload: Vec<UserDto> = users.into_iter().map(Into::into).collect();
    Ok(response::success(payload))
}

/// POST /api/users - Create a user account without credentials
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Missing fields or invalid email")
    )
)]
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    axum::Json(req): axum::Json<CreateUserRequest>,
) -> Result<Response, ApiFailure> {
    let (Some(first_name), Some(last_name), Some(email)) =
        (req.first_name, req.last_name, req.email)
    else {
        return Err(ApiFailure::bad_request("Incomplete values"));
    };

    if !email.contains('@') {
        return Err(ApiFailure::bad_request("Invalid email"));
    }

    let user = state
        .db
        .create_user(NewUser {
            first_name,
            last_name: Some(last_name),
            email,
            password: None,
            role: Role::default(),
        })
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => ApiFailure::bad_request("User already exists"),
            other => {
                error!("Failed to create user: {:?}", other);
                ApiFailure::internal("Failed to create user")
            }
        })?;

    Ok(response::created(UserDto::from(user)))
}

/// GET /api/users/{uid} - Fetch one user
#[utoipa::path(
    get,
    path = "/api/users/{uid}",
    params(("uid" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = UserDto),
        (status = 400, description = "Malformed user ID"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Response, ApiFailure> {
    let user_id = parse_id("User", &uid)?;

    let user = state.db.get_user_by_id(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ApiFailure::not_found("User not found"),
        other => {
            error!("Failed to fetch user {}: {:?}", user_id, other);
            ApiFailure::internal("Failed to retrieve user")
        }
    })?;

    Ok(response::success(UserDto::from(user)))
}

/// PUT /api/users/{uid} - Partially update a user
#[utoipa::path(
    put,
    path = "/api/users/{uid}",
    params(("uid" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Malformed user ID or invalid role"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    axum::Json(req): axum::Json<UpdateUserRequest>,
) -> Result<Response, ApiFailure> {
    let user_id = parse_id("User", &uid)?;

    let role = match req.role.as_deref() {
        Some(raw) => Some(
            Role::parse(raw).ok_or_else(|| ApiFailure::bad_request(format!("Invalid role: {raw}")))?,
        ),
        None => None,
    };

    // Check existence first so a missing user maps cleanly to 404.
    state.db.get_user_by_id(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ApiFailure::not_found("User not found"),
        other => {
            error!("Failed to fetch user {}: {:?}", user_id, other);
            ApiFailure::internal("Failed to update user")
        }
    })?;

    state
        .db
        .update_user(
            user_id,
            UserUpdate {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                role,
            },
        )
        .await
        .map_err(|e| {
            error!("Failed to update user {}: {:?}", user_id, e);
            ApiFailure::internal("Failed to update user")
        })?;

    Ok(response::success_message("User updated"))
}

/// DELETE /api/users/{uid} - Remove a user
#[utoipa::path(
    delete,
    path = "/api/users/{uid}",
    params(("uid" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Malformed user ID"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Response, ApiFailure> {
    let user_id = parse_id("User", &uid)?;

    state.db.delete_user(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ApiFailure::not_found("User not found"),
        other => {
            error!("Failed to delete user {}: {:?}", user_id, other);
            ApiFailure::internal("Failed to delete user")
        }
    })?;

    Ok(response::success_message("User deleted"))
}

/// POST /api/users/{uid}/documents - Attach uploaded documents to a user
///
/// Accepts a multipart/form-data request with up to five file parts.
#[utoipa::path(
    post,
    path = "/api/users/{uid}/documents",
    params(("uid" = String, Path, description = "User ID")),
    request_body(content_type = "multipart/form-data", description = "Document files"),
    responses(
        (status = 200, description = "Updated document list", body = [UserDocumentDto]),
        (status = 400, description = "No files uploaded or malformed user ID"),
        (status = 404, description = "User not found")
    )
)]
pub async fn upload_documents_handler(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    mut multipart: Multipart,
) -> Result<Response, ApiFailure> {
    let user_id = parse_id("User", &uid)?;

    // 1. Drain the multipart body into memory.
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart data: {}", e);
        ApiFailure::bad_request("Malformed multipart body")
    })? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if files.len() == MAX_DOCUMENTS_PER_UPLOAD {
            return Err(ApiFailure::bad_request(format!(
                "Too many files (max {MAX_DOCUMENTS_PER_UPLOAD})"
            )));
        }
        let data = field.bytes().await.map_err(|e| {
            error!("Failed to read file bytes: {}", e);
            ApiFailure::bad_request("Malformed multipart body")
        })?;
        files.push((file_name, data.to_vec()));
    }

    if files.is_empty() {
        return Err(ApiFailure::bad_request("No documents uploaded"));
    }

    // 2. The user must exist before anything touches the disk.
    state.db.get_user_by_id(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ApiFailure::not_found("User not found"),
        other => {
            error!("Failed to fetch user {}: {:?}", user_id, other);
            ApiFailure::internal("Failed to upload documents")
        }
    })?;

    // 3. Persist each file and record it on the user.
    let mut documents = Vec::with_capacity(files.len());
    for (file_name, data) in files {
        let stored = uploads::save_upload(
            &state.config.upload_dir,
            UploadKind::UserDocument,
            &file_name,
            &data,
        )
        .await
        .map_err(|e| {
            error!("Failed to store document: {}", e);
            ApiFailure::internal("Failed to store uploaded document")
        })?;
        documents.push(UserDocument {
            name: stored.name,
            reference: stored.path,
        });
    }

    let all_documents = state
        .db
        .add_user_documents(user_id, documents)
        .await
        .map_err(|e| {
            error!("Failed to record documents for {}: {:?}", user_id, e);
            ApiFailure::internal("Failed to upload documents")
        })?;

    let payload: Vec<UserDocumentDto> = all_documents.into_iter().map(Into::into).collect();
    Ok(response::success(payload))
}
