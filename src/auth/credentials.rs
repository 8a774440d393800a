use std::sync::Arc;
use tracing::debug;

use super::password::verify_password;
use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::repository::UserRepository;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Unknown user and wrong password are deliberately the same outcome
    #[error("Invalid username or password")]
    Rejected,
    #[error("Password hashing error: {0}")]
    Hashing(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Checks a username/password pair against the stored argon2 hash.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserRepository>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!("Login rejected: unknown user {}", username);
            return Err(CredentialError::Rejected);
        };

        let matches = verify_password(password, &user.password_hash)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        if !matches {
            debug!("Login rejected: wrong password for {}", username);
            return Err(CredentialError::Rejected);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::database::memory::MemoryRepository;
    use crate::database::models::{NewUser, Role};

    async fn verifier_with_alice() -> CredentialVerifier {
        let repo = MemoryRepository::new();
        repo.insert(NewUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: None,
            phone_number: None,
            password_hash: hash_password("wonderland1").unwrap(),
            role: Role::User,
            date_of_birth: None,
        })
        .await
        .unwrap();
        CredentialVerifier::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn accepts_correct_password() {
        let verifier = verifier_with_alice().await;
        let user = verifier.authenticate("alice", "wonderland1").await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let verifier = verifier_with_alice().await;
        let wrong = verifier.authenticate("alice", "not-the-password").await.unwrap_err();
        let unknown = verifier.authenticate("bob", "wonderland1").await.unwrap_err();
        assert!(matches!(wrong, CredentialError::Rejected));
        assert!(matches!(unknown, CredentialError::Rejected));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }
}
