//! services/api/src/web/dto.rs
//!
//! Wire representations of the domain entities. The user DTO is the only one
//! that meaningfully differs from its domain type: it never carries the
//! password hash.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use adoptme_core::domain::{Adoption, Pet, User, UserDocument};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDocumentDto {
    pub name: String,
    pub reference: String,
}

impl From<UserDocument> for UserDocumentDto {
    fn from(d: UserDocument) -> Self {
        Self {
            name: d.name,
            reference: d.reference,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub role: String,
    pub documents: Vec<UserDocumentDto>,
    pub last_connection: Option<DateTime<Utc>>,
    pub pets: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            role: u.role.as_str().to_string(),
            documents: u.documents.into_iter().map(Into::into).collect(),
            last_connection: u.last_connection,
            pets: u.pets,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PetDto {
    pub id: Uuid,
    pub name: String,
    pub specie: String,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
    pub adopted: bool,
    pub owner: Option<Uuid>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Pet> for PetDto {
    fn from(p: Pet) -> Self {
        Self {
            id: p.id,
            name: p.name,
            specie: p.specie,
            birth_date: p.birth_date,
            adopted: p.adopted,
            owner: p.owner,
            image: p.image,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdoptionDto {
    pub id: Uuid,
    pub owner: Uuid,
    pub pet: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Adoption> for AdoptionDto {
    fn from(a: Adoption) -> Self {
        Self {
            id: a.id,
            owner: a.owner,
            pet: a.pet,
            created_at: a.created_at,
        }
    }
}
