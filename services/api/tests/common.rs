//! Shared fixtures for the integration tests: an in-memory implementation of
//! the storage port, a router factory, and small request helpers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use adoptme_core::domain::{
    Adoption, NewPet, NewUser, Pet, PetUpdate, User, UserDocument, UserUpdate,
};
use adoptme_core::ports::{DatabaseService, PortError, PortResult};
use api_lib::config::Config;
use api_lib::web::{self, AppState};

//=========================================================================================
// In-Memory Storage Port
//=========================================================================================

#[derive(Default)]
pub struct MemDb {
    users: Mutex<HashMap<Uuid, User>>,
    pets: Mutex<HashMap<Uuid, Pet>>,
    adoptions: Mutex<HashMap<Uuid, Adoption>>,
    sessions: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
}

#[async_trait]
impl DatabaseService for MemDb {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == new_user.email) {
            return Err(PortError::Conflict(format!(
                "email {} already registered",
                new_user.email
            )));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            password: new_user.password,
            role: new_user.role,
            documents: Vec::new(),
            last_connection: None,
            pets: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn add_user_documents(
        &self,
        user_id: Uuid,
        documents: Vec<UserDocument>,
    ) -> PortResult<Vec<UserDocument>> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        user.documents.extend(documents);
        Ok(user.documents.clone())
    }

    async fn touch_last_connection(&self, user_id: Uuid) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        user.last_connection = Some(Utc::now());
        Ok(())
    }

    async fn create_pet(&self, new_pet: NewPet) -> PortResult<Pet> {
        let now = Utc::now();
        let pet = Pet {
            id: Uuid::new_v4(),
            name: new_pet.name,
            specie: new_pet.specie,
            birth_date: new_pet.birth_date,
            adopted: false,
            owner: None,
            image: new_pet.image,
            created_at: now,
            updated_at: now,
        };
        self.pets.lock().unwrap().insert(pet.id, pet.clone());
        Ok(pet)
    }

    async fn list_pets(&self) -> PortResult<Vec<Pet>> {
        Ok(self.pets.lock().unwrap().values().cloned().collect())
    }

    async fn get_pet_by_id(&self, pet_id: Uuid) -> PortResult<Pet> {
        self.pets
            .lock()
            .unwrap()
            .get(&pet_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Pet {} not found", pet_id)))
    }

    async fn update_pet(&self, pet_id: Uuid, update: PetUpdate) -> PortResult<()> {
        let mut pets = self.pets.lock().unwrap();
        let pet = pets
            .get_mut(&pet_id)
            .ok_or_else(|| PortError::NotFound(format!("Pet {} not found", pet_id)))?;
        if let Some(name) = update.name {
            pet.name = name;
        }
        if let Some(specie) = update.specie {
            pet.specie = specie;
        }
        if let Some(birth_date) = update.birth_date {
            pet.birth_date = birth_date;
        }
        if let Some(adopted) = update.adopted {
            pet.adopted = adopted;
        }
        if let Some(owner) = update.owner {
            pet.owner = owner;
        }
        if let Some(image) = update.image {
            pet.image = Some(image);
        }
        pet.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_pet(&self, pet_id: Uuid) -> PortResult<()> {
        self.pets
            .lock()
            .unwrap()
            .remove(&pet_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Pet {} not found", pet_id)))
    }

    async fn list_adoptions(&self) -> PortResult<Vec<Adoption>> {
        Ok(self.adoptions.lock().unwrap().values().cloned().collect())
    }

    async fn get_adoption_by_id(&self, adoption_id: Uuid) -> PortResult<Adoption> {
        self.adoptions
            .lock()
            .unwrap()
            .get(&adoption_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Adoption {} not found", adoption_id)))
    }

    async fn create_adoption(&self, owner_id: Uuid, pet_id: Uuid) -> PortResult<Adoption> {
        let mut users = self.users.lock().unwrap();
        let mut pets = self.pets.lock().unwrap();

        let pet = pets
            .get_mut(&pet_id)
            .ok_or_else(|| PortError::NotFound(format!("Pet {} not found", pet_id)))?;
        if pet.adopted {
            return Err(PortError::Conflict("Pet is already adopted".to_string()));
        }
        let owner = users
            .get_mut(&owner_id)
            .ok_or_else(|| PortError::Unexpected("owner vanished mid-adoption".to_string()))?;

        owner.pets.push(pet_id);
        pet.adopted = true;
        pet.owner = Some(owner_id);

        let adoption = Adoption {
            id: Uuid::new_v4(),
            owner: owner_id,
            pet: pet_id,
            created_at: Utc::now(),
        };
        self.adoptions
            .lock()
            .unwrap()
            .insert(adoption.id, adoption.clone());
        Ok(adoption)
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let sessions = self.sessions.lock().unwrap();
        match sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at >= Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }
}

//=========================================================================================
// App and Request Helpers
//=========================================================================================

pub const TEST_TOKEN_SECRET: &str = "integration-test-secret";

/// Builds the full router over a fresh in-memory store.
pub fn test_app() -> (Router, Arc<AppState>) {
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        upload_dir: std::env::temp_dir().join("adoptme-test-uploads"),
        token_secret: TEST_TOKEN_SECRET.to_string(),
    };
    let state = Arc::new(AppState {
        db: Arc::new(MemDb::default()),
        config: Arc::new(config),
    });
    (web::router(state.clone()), state)
}

pub fn hash_password(plain: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// Seeds a user with the given email and password and returns it.
pub async fn seed_user(state: &Arc<AppState>, email: &str, password: &str) -> User {
    state
        .db
        .create_user(NewUser {
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            email: email.to_string(),
            password: Some(hash_password(password)),
            role: Default::default(),
        })
        .await
        .unwrap()
}

/// Seeds an unadopted pet and returns it.
pub async fn seed_pet(state: &Arc<AppState>, name: &str) -> Pet {
    state
        .db
        .create_pet(NewPet {
            name: name.to_string(),
            specie: "dog".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
            image: None,
        })
        .await
        .unwrap()
}

/// Fires a request and returns the raw response.
pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

/// Fires a request and parses the JSON envelope.
pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = send(app, request).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    json_request("POST", uri, body)
}

pub fn put_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    json_request("PUT", uri, body)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

//=========================================================================================
// Multipart and Cookie Helpers
//=========================================================================================

pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

pub enum Part<'a> {
    Text { name: &'a str, value: &'a str },
    File { name: &'a str, filename: &'a str, data: &'a [u8] },
}

/// Hand-builds a multipart/form-data body for upload tests.
pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { name, filename, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Pulls the value of a named cookie out of the response's Set-Cookie headers.
pub fn response_cookie(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            cookie
                .split(';')
                .next()?
                .trim()
                .strip_prefix(prefix.as_str())
                .map(str::to_string)
        })
}
