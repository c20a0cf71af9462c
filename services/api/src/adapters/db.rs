//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use adoptme_core::domain::{
    Adoption, NewPet, NewUser, Pet, PetUpdate, Role, User, UserDocument, UserUpdate,
};
use adoptme_core::ports::{DatabaseService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Loads document and pet lists for the given users and assembles domain values.
    async fn hydrate_users(&self, records: Vec<UserRecord>) -> PortResult<Vec<User>> {
        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();

        let doc_rows = sqlx::query(
            "SELECT user_id, name, reference FROM user_documents WHERE user_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        let mut documents: HashMap<Uuid, Vec<UserDocument>> = HashMap::new();
        for row in doc_rows {
            documents.entry(row.get("user_id")).or_default().push(UserDocument {
                name: row.get("name"),
                reference: row.get("reference"),
            });
        }

        let pet_rows = sqlx::query(
            "SELECT user_id, pet_id FROM user_pets WHERE user_id = ANY($1) ORDER BY added_at",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        let mut pets: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in pet_rows {
            pets.entry(row.get("user_id")).or_default().push(row.get("pet_id"));
        }

        Ok(records
            .into_iter()
            .map(|r| {
                let docs = documents.remove(&r.id).unwrap_or_default();
                let user_pets = pets.remove(&r.id).unwrap_or_default();
                r.to_domain(docs, user_pets)
            })
            .collect())
    }
}

/// Maps low-level sqlx failures onto port errors.
fn map_db_err(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) => {
            PortError::Conflict(e.to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    first_name: String,
    last_name: Option<String>,
    email: String,
    password: Option<String>,
    role: String,
    last_connection: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self, documents: Vec<UserDocument>, pets: Vec<Uuid>) -> User {
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            role: Role::parse(&self.role).unwrap_or_default(),
            documents,
            last_connection: self.last_connection,
            pets,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct PetRecord {
    id: Uuid,
    name: String,
    specie: String,
    birth_date: NaiveDate,
    adopted: bool,
    owner_id: Option<Uuid>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PetRecord {
    fn to_domain(self) -> Pet {
        Pet {
            id: self.id,
            name: self.name,
            specie: self.specie,
            birth_date: self.birth_date,
            adopted: self.adopted,
            owner: self.owner_id,
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct AdoptionRecord {
    id: Uuid,
    owner_id: Uuid,
    pet_id: Uuid,
    created_at: DateTime<Utc>,
}

impl AdoptionRecord {
    fn to_domain(self) -> Adoption {
        Adoption {
            id: self.id,
            owner: self.owner_id,
            pet: self.pet_id,
            created_at: self.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password, role, last_connection, created_at, updated_at";
const PET_COLUMNS: &str =
    "id, name, specie, birth_date, adopted, owner_id, image, created_at, updated_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, first_name, last_name, email, password, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(record.to_domain(Vec::new(), Vec::new()))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        self.hydrate_users(records).await
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        let mut users = self.hydrate_users(vec![record]).await?;
        Ok(users.remove(0))
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        match record {
            Some(record) => {
                let mut users = self.hydrate_users(vec![record]).await?;
                Ok(Some(users.remove(0)))
            }
            None => Ok(None),
        }
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> PortResult<()> {
        // Read-modify-write; callers have already resolved the 404 case.
        let current = self.get_user_by_id(user_id).await?;

        let result = sqlx::query(
            "UPDATE users SET first_name = $2, last_name = $3, email = $4, role = $5, \
             updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .bind(update.first_name.unwrap_or(current.first_name))
        .bind(update.last_name.or(current.last_name))
        .bind(update.email.unwrap_or(current.email))
        .bind(update.role.unwrap_or(current.role).as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn add_user_documents(
        &self,
        user_id: Uuid,
        documents: Vec<UserDocument>,
    ) -> PortResult<Vec<UserDocument>> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        for document in &documents {
            sqlx::query("INSERT INTO user_documents (user_id, name, reference) VALUES ($1, $2, $3)")
                .bind(user_id)
                .bind(&document.name)
                .bind(&document.reference)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
        }

        let rows = sqlx::query(
            "SELECT name, reference FROM user_documents WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| UserDocument {
                name: row.get("name"),
                reference: row.get("reference"),
            })
            .collect())
    }

    async fn touch_last_connection(&self, user_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET last_connection = now() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn create_pet(&self, new_pet: NewPet) -> PortResult<Pet> {
        let record = sqlx::query_as::<_, PetRecord>(&format!(
            "INSERT INTO pets (id, name, specie, birth_date, image) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PET_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_pet.name)
        .bind(&new_pet.specie)
        .bind(new_pet.birth_date)
        .bind(&new_pet.image)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(record.to_domain())
    }

    async fn list_pets(&self) -> PortResult<Vec<Pet>> {
        let records = sqlx::query_as::<_, PetRecord>(&format!(
            "SELECT {PET_COLUMNS} FROM pets ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_pet_by_id(&self, pet_id: Uuid) -> PortResult<Pet> {
        let record = sqlx::query_as::<_, PetRecord>(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE id = $1"
        ))
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| PortError::NotFound(format!("Pet {} not found", pet_id)))?;

        Ok(record.to_domain())
    }

    async fn update_pet(&self, pet_id: Uuid, update: PetUpdate) -> PortResult<()> {
        let current = self.get_pet_by_id(pet_id).await?;

        sqlx::query(
            "UPDATE pets SET name = $2, specie = $3, birth_date = $4, adopted = $5, \
             owner_id = $6, image = $7, updated_at = now() WHERE id = $1",
        )
        .bind(pet_id)
        .bind(update.name.unwrap_or(current.name))
        .bind(update.specie.unwrap_or(current.specie))
        .bind(update.birth_date.unwrap_or(current.birth_date))
        .bind(update.adopted.unwrap_or(current.adopted))
        .bind(update.owner.unwrap_or(current.owner))
        .bind(update.image.or(current.image))
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn delete_pet(&self, pet_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(pet_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Pet {} not found", pet_id)));
        }
        Ok(())
    }

    async fn list_adoptions(&self) -> PortResult<Vec<Adoption>> {
        let records = sqlx::query_as::<_, AdoptionRecord>(
            "SELECT id, owner_id, pet_id, created_at FROM adoptions ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_adoption_by_id(&self, adoption_id: Uuid) -> PortResult<Adoption> {
        let record = sqlx::query_as::<_, AdoptionRecord>(
            "SELECT id, owner_id, pet_id, created_at FROM adoptions WHERE id = $1",
        )
        .bind(adoption_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| PortError::NotFound(format!("Adoption {} not found", adoption_id)))?;

        Ok(record.to_domain())
    }

    async fn create_adoption(&self, owner_id: Uuid, pet_id: Uuid) -> PortResult<Adoption> {
        // The whole three-table write runs inside one transaction. The row lock
        // on the pet makes concurrent adoptions of the same pet serialize, so
        // the adopted check below cannot be raced past.
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let pet_row = sqlx::query("SELECT adopted FROM pets WHERE id = $1 FOR UPDATE")
            .bind(pet_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| PortError::NotFound(format!("Pet {} not found", pet_id)))?;

        if pet_row.get::<bool, _>("adopted") {
            return Err(PortError::Conflict("Pet is already adopted".to_string()));
        }

        sqlx::query("INSERT INTO user_pets (user_id, pet_id) VALUES ($1, $2)")
            .bind(owner_id)
            .bind(pet_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query("UPDATE pets SET adopted = TRUE, owner_id = $2, updated_at = now() WHERE id = $1")
            .bind(pet_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        let record = sqlx::query_as::<_, AdoptionRecord>(
            "INSERT INTO adoptions (id, owner_id, pet_id) VALUES ($1, $2, $3) \
             RETURNING id, owner_id, pet_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(pet_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let row = sqlx::query("SELECT user_id, expires_at FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?
            .ok_or(PortError::Unauthorized)?;

        let expires_at: DateTime<Utc> = row.get("expires_at");
        if expires_at < Utc::now() {
            return Err(PortError::Unauthorized);
        }
        Ok(row.get("user_id"))
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}
