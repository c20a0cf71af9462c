//! services/api/src/web/pets.rs
//!
//! CRUD endpoints for pets, including the multipart image variant and the
//! mock-pet generator.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::response::Response;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;
use utoipa::ToSchema;

use adoptme_core::domain::{NewPet, PetUpdate};
use adoptme_core::ports::PortError;
use uuid::Uuid;

use crate::mocks;
use crate::uploads::{self, UploadKind};
use crate::web::dto::PetDto;
use crate::web::parse_id;
use crate::web::response::{self, ApiFailure};
use crate::web::state::AppState;

const MISSING_PET_FIELDS: &str = "All pet fields are required (name, specie, birthDate)";

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreatePetRequest {
    pub name: Option<String>,
    pub specie: Option<String>,
    #[serde(rename = "birthDate")]
    pub birth_date: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePetRequest {
    pub name: Option<String>,
    pub specie: Option<String>,
    #[serde(rename = "birthDate")]
    pub birth_date: Option<String>,
    pub adopted: Option<bool>,
    pub owner: Option<Uuid>,
    pub image: Option<String>,
}

#[derive(Deserialize)]
pub struct MockingQuery {
    pub count: Option<usize>,
}

fn parse_birth_date(raw: &str) -> Result<NaiveDate, ApiFailure> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiFailure::bad_request(format!("Invalid birthDate: {raw}")))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/pets - List all pets
#[utoipa::path(
    get,
    path = "/api/pets",
    responses(
        (status = 200, description = "All pets", body = [PetDto]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_pets_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiFailure> {
    let pets = state.db.list_pets().await.map_err(|e| {
        error!("Failed to list pets: {:?}", e);
        ApiFailure::internal("Error fetching pets from database")
    })?;

    let payload: Vec<PetDto> = pets.into_iter().map(Into::into).collect();
    Ok(response::success(payload))
}

/// POST /api/pets - Create a pet (no image)
#[utoipa::path(
    post,
    path = "/api/pets",
    request_body = CreatePetRequest,
    responses(
        (status = 200, description = "Pet created", body = PetDto),
        (status = 400, description = "Missing or invalid fields")
    )
)]
pub async fn create_pet_handler(
    State(state): State<Arc<AppState>>,
    axum::Json(req): axum::Json<CreatePetRequest>,
) -> Result<Response, ApiFailure> {
    let (Some(name), Some(specie), Some(birth_date)) = (req.name, req.specie, req.birth_date)
    else {
        return Err(ApiFailure::bad_request(MISSING_PET_FIELDS));
    };
    let birth_date = parse_birth_date(&birth_date)?;

    let pet = state
        .db
        .create_pet(NewPet {
            name,
            specie,
            birth_date,
            image: None,
        })
        .await
        .map_err(|e| {
            error!("Failed to create pet: {:?}", e);
            ApiFailure::internal("Failed to create pet")
        })?;

    Ok(response::success(PetDto::from(pet)))
}

/// POST /api/pets/withimage - Create a pet with an uploaded image
///
/// Accepts multipart/form-data with text parts `name`, `specie`, `birthDate`
/// and a file part `image`.
#[utoipa::path(
    post,
    path = "/api/pets/withimage",
    request_body(content_type = "multipart/form-data", description = "Pet fields plus image file"),
    responses(
        (status = 200, description = "Pet created", body = PetDto),
        (status = 400, description = "Missing fields or missing image file")
    )
)]
pub async fn create_pet_with_image_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiFailure> {
    let mut name = None;
    let mut specie = None;
    let mut birth_date = None;
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart data: {}", e);
        ApiFailure::bad_request("Malformed multipart body")
    })? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await.map_err(malformed_part)?),
            Some("specie") => specie = Some(field.text().await.map_err(malformed_part)?),
            Some("birthDate") => birth_date = Some(field.text().await.map_err(malformed_part)?),
            Some("image") => {
                let file_name = field.file_name().unwrap_or("pet").to_string();
                let data = field.bytes().await.map_err(malformed_part)?;
                image = Some((file_name, data.to_vec()));
            }
            _ => {}
        }
    }

    let Some((file_name, data)) = image else {
        return Err(ApiFailure::bad_request("Image file is required"));
    };
    let (Some(name), Some(specie), Some(birth_date)) = (name, specie, birth_date) else {
        return Err(ApiFailure::bad_request(MISSING_PET_FIELDS));
    };
    let birth_date = parse_birth_date(&birth_date)?;

    let stored = uploads::save_upload(
        &state.config.upload_dir,
        UploadKind::PetImage,
        &file_name,
        &data,
    )
    .await
    .map_err(|e| {
        error!("Failed to store pet image: {}", e);
        ApiFailure::internal("Failed to store uploaded image")
    })?;

    let pet = state
        .db
        .create_pet(NewPet {
            name,
            specie,
            birth_date,
            image: Some(stored.path),
        })
        .await
        .map_err(|e| {
            error!("Failed to create pet: {:?}", e);
            ApiFailure::internal("Failed to create pet")
        })?;

    Ok(response::success(PetDto::from(pet)))
}

fn malformed_part(e: axum::extract::multipart::MultipartError) -> ApiFailure {
    error!("Failed to read multipart field: {}", e);
    ApiFailure::bad_request("Malformed multipart body")
}

/// PUT /api/pets/{pid} - Partially update a pet
#[utoipa::path(
    put,
    path = "/api/pets/{pid}",
    params(("pid" = String, Path, description = "Pet ID")),
    request_body = UpdatePetRequest,
    responses(
        (status = 200, description = "Pet updated"),
        (status = 400, description = "Malformed pet ID or invalid fields"),
        (status = 404, description = "Pet not found")
    )
)]
pub async fn update_pet_handler(
    State(state): State<Arc<AppState>>,
    Path(pid): Path<String>,
    axum::Json(req): axum::Json<UpdatePetRequest>,
) -> Result<Response, ApiFailure> {
    let pet_id = parse_id("Pet", &pid)?;

    let birth_date = match req.birth_date.as_deref() {
        Some(raw) => Some(parse_birth_date(raw)?),
        None => None,
    };

    state.db.get_pet_by_id(pet_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ApiFailure::not_found("Pet not found"),
        other => {
            error!("Failed to fetch pet {}: {:?}", pet_id, other);
            ApiFailure::internal("Failed to update pet")
        }
    })?;

    state
        .db
        .update_pet(
            pet_id,
            PetUpdate {
                name: req.name,
                specie: req.specie,
                birth_date,
                adopted: req.adopted,
                owner: req.owner.map(Some),
                image: req.image,
            },
        )
        .await
        .map_err(|e| {
            error!("Failed to update pet {}: {:?}", pet_id, e);
            ApiFailure::internal("Failed to update pet")
        })?;

    Ok(response::success_message("pet updated"))
}

/// DELETE /api/pets/{pid} - Remove a pet
#[utoipa::path(
    delete,
    path = "/api/pets/{pid}",
    params(("pid" = String, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "Pet deleted"),
        (status = 400, description = "Malformed pet ID"),
        (status = 404, description = "Pet not found")
    )
)]
pub async fn delete_pet_handler(
    State(state): State<Arc<AppState>>,
    Path(pid): Path<String>,
) -> Result<Response, ApiFailure> {
    let pet_id = parse_id("Pet", &pid)?;

    state.db.delete_pet(pet_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ApiFailure::not_found("Pet not found"),
        other => {
            error!("Failed to delete pet {}: {:?}", pet_id, other);
            ApiFailure::internal("Failed to delete pet")
        }
    })?;

    Ok(response::success_message("pet deleted"))
}

/// GET /api/pets/mockingpets - Generate synthetic pets (not persisted)
#[utoipa::path(
    get,
    path = "/api/pets/mockingpets",
    params(("count" = Option<usize>, Query, description = "Number of pets to generate (default 100)")),
    responses(
        (status = 200, description = "Generated pets", body = [mocks::MockPet])
    )
)]
pub async fn mocking_pets_handler(Query(query): Query<MockingQuery>) -> Response {
    let count = query.count.unwrap_or(100);
    response::success(mocks::generate_many_pets(count))
}
