pub mod domain;
pub mod ports;

pub use domain::{
    Adoption, AuthSession, NewPet, NewUser, Pet, PetUpdate, Role, User, UserDocument, UserUpdate,
};
pub use ports::{DatabaseService, PortError, PortResult};
