//! crates/adoptme_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework; the serde
//! derives exist because user data travels inside signed token payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access level attached to every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Premium,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "premium" => Some(Role::Premium),
            _ => None,
        }
    }
}

/// A document attached to a user account (e.g. an uploaded identity file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    pub name: String,
    pub reference: String,
}

/// Represents a registered user account.
///
/// `password` holds the argon2 hash, never the plaintext. It is `None` for
/// accounts created through the plain user-creation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: Option<String>,
    pub role: Role,
    pub documents: Vec<UserDocument>,
    pub last_connection: Option<DateTime<Utc>>,
    pub pets: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: Option<String>,
    pub role: Role,
}

/// Partial update applied to an existing user. `None` fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Represents a pet available for (or already in) adoption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub specie: String,
    pub birth_date: NaiveDate,
    pub adopted: bool,
    pub owner: Option<Uuid>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a pet.
#[derive(Debug, Clone)]
pub struct NewPet {
    pub name: String,
    pub specie: String,
    pub birth_date: NaiveDate,
    pub image: Option<String>,
}

/// Partial update applied to an existing pet. `None` fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct PetUpdate {
    pub name: Option<String>,
    pub specie: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub adopted: Option<bool>,
    pub owner: Option<Option<Uuid>>,
    pub image: Option<String>,
}

/// Links one user to one pet. Created once, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adoption {
    pub id: Uuid,
    pub owner: Uuid,
    pub pet: Uuid,
    pub created_at: DateTime<Utc>,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
