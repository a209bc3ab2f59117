use sqlx::{query, query_scalar, PgPool};
use uuid::Uuid;

use crate::core::ports::directory::{AccountDirectory, NewIdentity};
use crate::error::Error;
use crate::hex::ToHex;
use crate::rand::{thread_rng, Rng};
use crate::sha2::{Digest, Sha256};

// Identity store backed by its own users table, reached only through the
// AccountDirectory port.
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn hash_password(pass: &str, slt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass);
    hasher.update(slt);
    hasher.finalize().encode_hex()
}

fn random_salt() -> String {
    const CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = thread_rng();
    (0..32).map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char).collect()
}

// Failures here are failures of a separate system, not of the data store the
// caller may have a transaction open against.
fn remote(e: sqlx::Error) -> Error {
    match Error::from(e) {
        Error::Database(e) => Error::Remote(format!("account directory call failed: {}", e)),
        other => other,
    }
}

impl AccountDirectory for PgDirectory {
    async fn create_identity(&mut self, identity: NewIdentity) -> Result<Uuid, Error> {
        let mut conn = self.pool.acquire().await.map_err(remote)?;
        let salt = random_salt();
        let id = query_scalar("INSERT INTO users (email, password, salt, role, username) VALUES ($1, $2, $3, $4, $5) RETURNING id")
            .bind(&identity.email)
            .bind(hash_password(&identity.password, &salt))
            .bind(&salt)
            .bind(identity.role)
            .bind(&identity.username)
            .fetch_one(&mut conn)
            .await
            .map_err(|e| match remote(e) {
                Error::Conflict(_) => Error::Conflict(format!("email {} is already registered", identity.email)),
                other => other,
            })?;
        Ok(id)
    }

    async fn delete_identity(&mut self, id: Uuid) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await.map_err(remote)?;
        query("DELETE FROM users WHERE id = $1").bind(id).execute(&mut conn).await.map_err(remote)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_salted() {
        let a = hash_password("ZEH-0001", "salt-a");
        assert_eq!(a, hash_password("ZEH-0001", "salt-a"));
        assert_ne!(a, hash_password("ZEH-0001", "salt-b"));
        assert_ne!(a, hash_password("ZEH-0002", "salt-a"));
    }

    #[test]
    fn test_random_salt_shape() {
        let salt = random_salt();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(salt, random_salt());
    }
}
