use uuid::Uuid;

use crate::core::models::profile::Role;
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub username: String,
}

// Login identities live in a separate account store. Calls may fail
// independently of any data-store transaction in flight.
pub trait AccountDirectory {
    async fn create_identity(&mut self, identity: NewIdentity) -> Result<Uuid, Error>;
    async fn delete_identity(&mut self, id: Uuid) -> Result<(), Error>;
}
