pub mod adoptions;
pub mod docs;
pub mod dto;
pub mod logger_probe;
pub mod mocks;
pub mod pets;
pub mod response;
pub mod sessions;
pub mod state;
pub mod users;

pub use docs::ApiDoc;
pub use state::AppState;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use uuid::Uuid;

use response::ApiFailure;

/// Parses a path id, answering 400 with the uniform envelope on bad input so
/// no storage call ever sees a malformed identifier.
pub(crate) fn parse_id(kind: &str, raw: &str) -> Result<Uuid, ApiFailure> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiFailure::bad_request(format!("Invalid {kind} ID format: {raw}")))
}

/// Assembles the complete API router. The Swagger UI is merged in by the
/// binary so tests can drive this router without it.
pub fn router(state: Arc<AppState>) -> Router {
    let users = Router::new()
        .route(
            "/",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route(
            "/{uid}",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
        .route("/{uid}/documents", post(users::upload_documents_handler));

    let pets = Router::new()
        .route(
            "/",
            get(pets::list_pets_handler).post(pets::create_pet_handler),
        )
        .route("/withimage", post(pets::create_pet_with_image_handler))
        .route("/mockingpets", get(pets::mocking_pets_handler))
        .route(
            "/{pid}",
            put(pets::update_pet_handler).delete(pets::delete_pet_handler),
        );

    let adoptions = Router::new()
        .route("/", get(adoptions::list_adoptions_handler))
        .route("/{aid}", get(adoptions::get_adoption_handler))
        .route("/{uid}/{pid}", post(adoptions::create_adoption_handler));

    let sessions = Router::new()
        .route("/register", post(sessions::register_handler))
        .route("/login", post(sessions::login_handler))
        .route("/logout", post(sessions::logout_handler))
        .route("/current", get(sessions::current_handler))
        .route("/unprotectedLogin", get(sessions::unprotected_login_handler))
        .route(
            "/unprotectedCurrent",
            get(sessions::unprotected_current_handler),
        );

    let mocks = Router::new()
        .route("/mockingpets", get(mocks::mocking_pets_handler))
        .route("/mockingusers", get(mocks::mocking_users_handler))
        .route("/generateData", post(mocks::generate_data_handler));

    Router::new()
        .nest("/api/users", users)
        .nest("/api/pets", pets)
        .nest("/api/adoptions", adoptions)
        .nest("/api/sessions", sessions)
        .nest("/api/mocks", mocks)
        .route("/loggerTest", get(logger_probe::logger_test_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(state)
}
