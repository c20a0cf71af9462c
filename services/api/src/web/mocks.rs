//! services/api/src/web/mocks.rs
//!
//! Test-data endpoints: generate synthetic users/pets, optionally persisting
//! them in one shot.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

use adoptme_core::domain::{NewPet, NewUser};

use crate::mocks;
use crate::web::dto::{PetDto, UserDto};
use crate::web::pets::MockingQuery;
use crate::web::response::{self, ApiFailure};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct GenerateDataRequest {
    pub users: Option<usize>,
    pub pets: Option<usize>,
}

/// GET /api/mocks/mockingpets - Generate synthetic pets (not persisted)
#[utoipa::path(
    get,
    path = "/api/mocks/mockingpets",
    params(("count" = Option<usize>, Query, description = "Number of pets to generate (default 100)")),
    responses(
        (status = 200, description = "Generated pets", body = [mocks::MockPet])
    )
)]
pub async fn mocking_pets_handler(Query(query): Query<MockingQuery>) -> Response {
    let count = query.count.unwrap_or(100);
    response::success(mocks::generate_many_pets(count))
}

/// GET /api/mocks/mockingusers - Generate 50 synthetic users (not persisted)
#[utoipa::path(
    get,
    path = "/api/mocks/mockingusers",
    responses(
        (status = 200, description = "Generated users", body = [mocks::MockUser])
    )
)]
pub async fn mocking_users_handler() -> Response {
    response::success(mocks::generate_many_users(50))
}

/// POST /api/mocks/generateData - Generate and persist synthetic records
#[utoipa::path(
    post,
    path = "/api/mocks/generateData",
    request_body = GenerateDataRequest,
    responses(
        (status = 200, description = "Records stored; response lists everything now in the store"),
        (status = 500, description = "Generation or storage failure")
    )
)]
pub async fn generate_data_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateDataRequest>,
) -> Result<Response, ApiFailure> {
    let users = mocks::generate_many_users(req.users.unwrap_or(0));
    let pets = mocks::generate_many_pets(req.pets.unwrap_or(0));

    for user in users {
        state
            .db
            .create_user(NewUser {
                first_name: user.first_name,
                last_name: Some(user.last_name),
                email: user.email,
                password: Some(user.password),
                role: user.role,
            })
            .await
            .map_err(|e| {
                error!("Failed to store generated user: {:?}", e);
                ApiFailure::internal("Failed to generate data")
            })?;
    }

    for pet in pets {
        state
            .db
            .create_pet(NewPet {
                name: pet.name,
                specie: pet.specie,
                birth_date: pet.birth_date,
                image: Some(pet.image),
            })
            .await
            .map_err(|e| {
                error!("Failed to store generated pet: {:?}", e);
                ApiFailure::internal("Failed to generate data")
            })?;
    }

    let all_users: Vec<UserDto> = state
        .db
        .list_users()
        .await
        .map_err(|e| {
            error!("Failed to list users: {:?}", e);
            ApiFailure::internal("Failed to generate data")
        })?
        .into_iter()
        .map(Into::into)
        .collect();

    let all_pets: Vec<PetDto> = state
        .db
        .list_pets()
        .await
        .map_err(|e| {
            error!("Failed to list pets: {:?}", e);
            ApiFailure::internal("Failed to generate data")
        })?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({
        "status": "success",
        "message": "Data generated and stored",
        "usersInserted": all_users,
        "petsInserted": all_pets,
    }))
    .into_response())
}
