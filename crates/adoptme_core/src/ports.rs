//! crates/adoptme_core/src/ports.rs
//!
//! Defines the service contract (trait) for the application's storage layer.
//! This trait forms the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete database implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Adoption, NewPet, NewUser, Pet, PetUpdate, User, UserDocument, UserUpdate,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the underlying store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Port (Trait)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    /// Lookup by unique email; `Ok(None)` when no account uses the address.
    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>>;

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> PortResult<()>;

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()>;

    /// Appends documents to the user's list and returns the full list.
    async fn add_user_documents(
        &self,
        user_id: Uuid,
        documents: Vec<UserDocument>,
    ) -> PortResult<Vec<UserDocument>>;

    /// Stamps the user's `last_connection` with the current time.
    async fn touch_last_connection(&self, user_id: Uuid) -> PortResult<()>;

    // --- Pet Management ---
    async fn create_pet(&self, new_pet: NewPet) -> PortResult<Pet>;

    async fn list_pets(&self) -> PortResult<Vec<Pet>>;

    async fn get_pet_by_id(&self, pet_id: Uuid) -> PortResult<Pet>;

    async fn update_pet(&self, pet_id: Uuid, update: PetUpdate) -> PortResult<()>;

    async fn delete_pet(&self, pet_id: Uuid) -> PortResult<()>;

    // --- Adoption Management ---
    async fn list_adoptions(&self) -> PortResult<Vec<Adoption>>;

    async fn get_adoption_by_id(&self, adoption_id: Uuid) -> PortResult<Adoption>;

    /// Performs the whole adoption write as one atomic unit: appends the pet
    /// to the owner's pet list, marks the pet adopted with its new owner, and
    /// records the Adoption. Fails with `NotFound` if the pet is missing and
    /// `Conflict` if it is already adopted; in either case nothing is written.
    async fn create_adoption(&self, owner_id: Uuid, pet_id: Uuid) -> PortResult<Adoption>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owning user id if the session exists and has not expired.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}
