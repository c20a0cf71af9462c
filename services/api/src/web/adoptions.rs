//! services/api/src/web/adoptions.rs
//!
//! The adoption workflow: listing, lookup, and the create operation that
//! links a user and a pet.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use tracing::{error, info};

use adoptme_core::ports::PortError;

use crate::web::dto::AdoptionDto;
use crate::web::parse_id;
use crate::web::response::{self, ApiFailure};
use crate::web::state::AppState;

/// GET /api/adoptions - List all adoptions
#[utoipa::path(
    get,
    path = "/api/adoptions",
    responses(
        (status = 200, description = "All adoptions", body = [AdoptionDto]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_adoptions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiFailure> {
    let adoptions = state.db.list_adoptions().await.map_err(|e| {
        error!("Failed to list adoptions: {:?}", e);
        ApiFailure::internal("Internal server error fetching adoptions")
    })?;

    let payload: Vec<AdoptionDto> = adoptions.into_iter().map(Into::into).collect();
    Ok(response::success(payload))
}

/// GET /api/adoptions/{aid} - Fetch one adoption
#[utoipa::path(
    get,
    path = "/api/adoptions/{aid}",
    params(("aid" = String, Path, description = "Adoption ID")),
    responses(
        (status = 200, description = "The adoption", body = AdoptionDto),
        (status = 400, description = "Malformed adoption ID"),
        (status = 404, description = "Adoption not found")
    )
)]
pub async fn get_adoption_handler(
    State(state): State<Arc<AppState>>,
    Path(aid): Path<String>,
) -> Result<Response, ApiFailure> {
    let adoption_id = parse_id("Adoption", &aid)?;

    let adoption = state
        .db
        .get_adoption_by_id(adoption_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ApiFailure::not_found("Adoption not found"),
            other => {
                error!("Failed to fetch adoption {}: {:?}", adoption_id, other);
                ApiFailure::internal("Internal server error fetching adoption")
            }
        })?;

    Ok(response::success(AdoptionDto::from(adoption)))
}

/// POST /api/adoptions/{uid}/{pid} - Adopt a pet
///
/// Both ids are validated before any storage access. The user must exist, the
/// pet must exist and be unadopted; the write itself (owner's pet list, pet
/// flags, adoption record) is atomic in the storage layer.
#[utoipa::path(
    post,
    path = "/api/adoptions/{uid}/{pid}",
    params(
        ("uid" = String, Path, description = "Adopting user ID"),
        ("pid" = String, Path, description = "Pet ID")
    ),
    responses(
        (status = 200, description = "Adoption created", body = AdoptionDto),
        (status = 400, description = "Malformed ID or pet already adopted"),
        (status = 404, description = "User or pet not found")
    )
)]
pub async fn create_adoption_handler(
    State(state): State<Arc<AppState>>,
    Path((uid, pid)): Path<(String, String)>,
) -> Result<Response, ApiFailure> {
    let user_id = parse_id("User", &uid)?;
    let pet_id = parse_id("Pet", &pid)?;

    let user = state.db.get_user_by_id(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ApiFailure::not_found("User not found"),
        other => {
            error!("Failed to fetch user {}: {:?}", user_id, other);
            ApiFailure::internal("Internal server error during adoption process")
        }
    })?;

    let adoption = state
        .db
        .create_adoption(user.id, pet_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ApiFailure::not_found("Pet not found"),
            PortError::Conflict(message) => ApiFailure::bad_request(message),
            other => {
                error!("Adoption of pet {} by {} failed: {:?}", pet_id, user_id, other);
                ApiFailure::internal("Internal server error during adoption process")
            }
        })?;

    info!(
        "Adoption created successfully: User {} adopted Pet {}. Adoption ID: {}",
        user_id, pet_id, adoption.id
    );

    Ok(response::success(AdoptionDto::from(adoption)))
}
