//! services/api/src/mocks.rs
//!
//! Synthetic data generators backing the mocking endpoints. Generated records
//! carry the same field set as the stored entities but are not persisted
//! unless the caller explicitly inserts them.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::{Days, NaiveDate, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use adoptme_core::domain::Role;

const PET_NAMES: &[&str] = &[
    "Luna", "Max", "Bella", "Rocky", "Daisy", "Toby", "Coco", "Simba", "Nala", "Thor",
];
const SPECIES: &[&str] = &["dog", "cat", "bird", "hamster"];

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elena", "Franco", "Gabriela", "Hugo", "Irene", "Julian",
];
const LAST_NAMES: &[&str] = &[
    "Alvarez", "Benitez", "Castro", "Dominguez", "Esposito", "Fernandez", "Gomez", "Herrera",
];
const MOCK_ROLES: &[Role] = &[Role::User, Role::Admin];

/// Every generated user shares this password, pre-hashed once per batch.
const MOCK_PASSWORD: &str = "coder123";

/// A synthetic pet, shaped like the stored entity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MockPet {
    pub id: Uuid,
    pub name: String,
    pub specie: String,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
    pub adopted: bool,
    pub owner: Option<Uuid>,
    pub image: String,
}

/// A synthetic user, shaped like the stored entity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MockUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub pets: Vec<Uuid>,
}

fn pick<'a>(pool: &'a [&'a str], rng: &mut impl Rng) -> &'a str {
    pool.choose(rng).copied().unwrap_or(pool[0])
}

fn generate_pet(rng: &mut impl Rng) -> MockPet {
    MockPet {
        id: Uuid::new_v4(),
        name: pick(PET_NAMES, rng).to_string(),
        specie: pick(SPECIES, rng).to_string(),
        birth_date: Utc::now().date_naive() - Days::new(rng.random_range(0..7 * 365)),
        adopted: false,
        owner: None,
        image: format!(
            "https://loremflickr.com/640/480/animals?lock={}",
            rng.random_range(0..100_000)
        ),
    }
}

pub fn generate_many_pets(count: usize) -> Vec<MockPet> {
    let mut rng = rand::rng();
    (0..count).map(|_| generate_pet(&mut rng)).collect()
}

pub fn generate_many_users(count: usize) -> Vec<MockUser> {
    let mut rng = rand::rng();

    // One argon2 run per batch, not per user.
    let salt = SaltString::generate(&mut OsRng);
    let password = Argon2::default()
        .hash_password(MOCK_PASSWORD.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .unwrap_or_default();

    (0..count)
        .map(|_| {
            let first_name = pick(FIRST_NAMES, &mut rng).to_string();
            let last_name = pick(LAST_NAMES, &mut rng).to_string();
            let email = format!(
                "{}.{}{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                rng.random_range(1..100_000)
            );
            MockUser {
                id: Uuid::new_v4(),
                first_name,
                last_name,
                email,
                password: password.clone(),
                role: *MOCK_ROLES.choose(&mut rng).unwrap_or(&Role::User),
                pets: Vec::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_number_of_pets() {
        let pets = generate_many_pets(5);
        assert_eq!(pets.len(), 5);
        for pet in &pets {
            assert!(!pet.adopted);
            assert!(pet.owner.is_none());
            assert!(pet.image.contains("loremflickr"));
            assert!(SPECIES.contains(&pet.specie.as_str()));
            assert!(pet.birth_date <= Utc::now().date_naive());
        }
    }

    #[test]
    fn generates_users_with_hashed_password() {
        let users = generate_many_users(3);
        assert_eq!(users.len(), 3);
        for user in &users {
            assert!(user.email.contains('@'));
            assert!(user.password.starts_with("$argon2"));
            assert!(user.pets.is_empty());
        }
    }

    #[test]
    fn zero_count_yields_empty_batch() {
        assert!(generate_many_pets(0).is_empty());
        assert!(generate_many_users(0).is_empty());
    }
}
