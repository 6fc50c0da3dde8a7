//! User Account Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::AuthUser;
use surrealdb::RecordId;

/// User ID type
pub type UserId = RecordId;

/// User account matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    pub created_at: i64,
}

impl UserAccount {
    /// Record key without the table prefix
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.key(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }

    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }
}
