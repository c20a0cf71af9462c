//! services/api/src/web/docs.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::mocks::{MockPet, MockUser};
use crate::web::dto::{AdoptionDto, PetDto, UserDocumentDto, UserDto};
use crate::web::mocks::GenerateDataRequest;
use crate::web::pets::{CreatePetRequest, UpdatePetRequest};
use crate::web::sessions::{LoginRequest, RegisterRequest};
use crate::web::users::{CreateUserRequest, UpdateUserRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::users::list_users_handler,
        crate::web::users::create_user_handler,
        crate::web::users::get_user_handler,
        crate::web::users::update_user_handler,
        crate::web::users::delete_user_handler,
        crate::web::users::upload_documents_handler,
        crate::web::pets::list_pets_handler,
        crate::web::pets::create_pet_handler,
        crate::web::pets::create_pet_with_image_handler,
        crate::web::pets::update_pet_handler,
        crate::web::pets::delete_pet_handler,
        crate::web::pets::mocking_pets_handler,
        crate::web::adoptions::list_adoptions_handler,
        crate::web::adoptions::get_adoption_handler,
        crate::web::adoptions::create_adoption_handler,
        crate::web::sessions::register_handler,
        crate::web::sessions::login_handler,
        crate::web::sessions::logout_handler,
        crate::web::sessions::current_handler,
        crate::web::sessions::unprotected_login_handler,
        crate::web::sessions::unprotected_current_handler,
        crate::web::mocks::mocking_pets_handler,
        crate::web::mocks::mocking_users_handler,
        crate::web::mocks::generate_data_handler,
        crate::web::logger_probe::logger_test_handler,
    ),
    components(schemas(
        UserDto,
        UserDocumentDto,
        PetDto,
        AdoptionDto,
        MockPet,
        MockUser,
        CreateUserRequest,
        UpdateUserRequest,
        CreatePetRequest,
        UpdatePetRequest,
        RegisterRequest,
        LoginRequest,
        GenerateDataRequest,
    )),
    tags(
        (name = "Adoptme API", description = "REST endpoints for the pet-adoption service.")
    )
)]
pub struct ApiDoc;
