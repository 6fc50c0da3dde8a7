//! User Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{UserAccount, now_millis};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find account by record key
    pub async fn find_by_key(&self, key: &str) -> RepoResult<Option<UserAccount>> {
        let thing = RecordId::from_table_key("user", key);
        let user: Option<UserAccount> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find account by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserAccount>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<UserAccount> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new account
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> RepoResult<UserAccount> {
        // Check duplicate email
        if self.find_by_email(email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                email
            )));
        }

        // Hash password
        let hash_pass = UserAccount::hash_password(password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let display_name = display_name.unwrap_or_else(|| email.to_string());

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    email = $email,
                    display_name = $display_name,
                    hash_pass = $hash_pass,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("email", email.to_string()))
            .bind(("display_name", display_name))
            .bind(("hash_pass", hash_pass))
            .bind(("created_at", now_millis()))
            .await?;

        let created: Option<UserAccount> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }
}
