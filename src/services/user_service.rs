use chrono::{Months, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::password::hash_password;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, Role, User};
use crate::database::repository::UserRepository;

const USERNAME_MIN_LENGTH: usize = 4;
const USERNAME_MAX_LENGTH: usize = 30;
const PASSWORD_MIN_LENGTH: usize = 9;
const PASSWORD_MAX_LENGTH: usize = 30;
const MAX_AGE_YEARS: u32 = 120;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{8,15}$").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Password hashing error: {0}")]
    Hashing(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub email: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone_number: user.phone_number,
            role: user.role,
            date_of_birth: user.date_of_birth,
        }
    }
}

/// Registration, self-service profile and admin user management
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, UserError> {
        validate_username(&request.username)?;
        validate_password(&request.password)?;
        validate_email(&request.email, "Email must be a valid format")?;
        let phone_number = validate_phone(request.phone_number.as_deref(), "Phone number must be 8-15 digits, optionally starting with +")?;
        let date_of_birth = parse_date_of_birth(request.date_of_birth.as_deref())?;

        // Uniqueness checks
        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(UserError::Validation("Username already exists".to_string()));
        }
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(UserError::Validation("Email already in use".to_string()));
        }

        let password_hash = hash_password(&request.password).map_err(|e| UserError::Hashing(e.to_string()))?;

        let saved = self
            .users
            .insert(NewUser {
                username: request.username,
                email: request.email,
                full_name: request.full_name,
                phone_number,
                password_hash,
                role: Role::User,
                date_of_birth,
            })
            .await
            .map_err(conflict_as_validation)?;

        info!("Registered user {} (id {})", saved.username, saved.id);
        Ok(saved.into())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, UserError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(format!("User not found for username: {}", username)))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User, UserError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn me(&self, user_id: i64) -> Result<UserResponse, UserError> {
        Ok(self.find_by_id(user_id).await?.into())
    }

    /// Replace email and phone number; date of birth is kept when omitted.
    pub async fn update_me(&self, user_id: i64, request: UpdateProfileRequest) -> Result<UserResponse, UserError> {
        let mut user = self.find_by_id(user_id).await?;

        validate_email(&request.email, "Invalid email format")?;
        if request.email != user.email && self.users.find_by_email(&request.email).await?.is_some() {
            return Err(UserError::Validation("Email already in use".to_string()));
        }
        let phone_number = validate_phone(request.phone_number.as_deref(), "Phone number must be valid")?;
        if let Some(dob) = parse_date_of_birth(request.date_of_birth.as_deref())? {
            user.date_of_birth = Some(dob);
        }

        user.email = request.email;
        user.phone_number = phone_number;
        user.updated_at = Utc::now();

        let saved = self.users.update(&user).await.map_err(conflict_as_validation)?;
        Ok(saved.into())
    }

    pub async fn list(&self) -> Result<Vec<UserResponse>, UserError> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn update_role(&self, id: i64, role: &str) -> Result<UserResponse, UserError> {
        let role = Role::parse(role)
            .ok_or_else(|| UserError::Validation(format!("Unknown role '{}', expected USER or ADMIN", role)))?;

        let mut user = self.find_by_id(id).await?;
        user.role = role.as_str().to_string();
        user.updated_at = Utc::now();

        let saved = self.users.update(&user).await?;
        info!("User {} role set to {}", saved.id, saved.role);
        Ok(saved.into())
    }

    pub async fn delete(&self, id: i64) -> Result<(), UserError> {
        if !self.users.delete(id).await? {
            return Err(UserError::NotFound(format!("User with id {} not found", id)));
        }
        info!("Deleted user {}", id);
        Ok(())
    }
}

fn conflict_as_validation(err: DatabaseError) -> UserError {
    match err {
        DatabaseError::Conflict(msg) => UserError::Validation(msg),
        other => UserError::Database(other),
    }
}

fn validate_username(username: &str) -> Result<(), UserError> {
    let len = username.chars().count();
    if username.trim().is_empty() || !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
        return Err(UserError::Validation(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
        )));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), UserError> {
    let len = password.chars().count();
    if password.trim().is_empty() || !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&len) {
        return Err(UserError::Validation(format!(
            "Password must be between {} and {} characters",
            PASSWORD_MIN_LENGTH, PASSWORD_MAX_LENGTH
        )));
    }
    Ok(())
}

fn validate_email(email: &str, message: &str) -> Result<(), UserError> {
    if !EMAIL_RE.is_match(email) {
        return Err(UserError::Validation(message.to_string()));
    }
    Ok(())
}

/// Blank phone numbers are stored as absent.
fn validate_phone(phone: Option<&str>, message: &str) -> Result<Option<String>, UserError> {
    match phone.map(str::trim) {
        None | Some("") => Ok(None),
        Some(p) if PHONE_RE.is_match(p) => Ok(Some(p.to_string())),
        Some(_) => Err(UserError::Validation(message.to_string())),
    }
}

fn parse_date_of_birth(value: Option<&str>) -> Result<Option<NaiveDate>, UserError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let dob = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| UserError::Validation("Date of birth must be in YYYY-MM-DD format".to_string()))?;

    let today = Utc::now().date_naive();
    if dob > today {
        return Err(UserError::Validation("Date of birth cannot be in the future".to_string()));
    }
    let oldest = today.checked_sub_months(Months::new(12 * MAX_AGE_YEARS)).unwrap_or(NaiveDate::MIN);
    if dob < oldest {
        return Err(UserError::Validation(format!(
            "Date of birth cannot be more than {} years ago",
            MAX_AGE_YEARS
        )));
    }

    Ok(Some(dob))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryRepository;
    use chrono::Duration;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryRepository::new()))
    }

    fn request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            full_name: Some("Alice Liddell".to_string()),
            phone_number: None,
            date_of_birth: None,
        }
    }

    fn validation_message(err: UserError) -> String {
        match err {
            UserError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn registers_with_user_role() {
        let service = service();
        let user = service.register(request("alice", "alice@example.com")).await.unwrap();
        assert_eq!(user.role, "USER");
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn rejects_bad_lengths() {
        let service = service();
        let err = service.register(request("abc", "a@example.com")).await.unwrap_err();
        assert!(validation_message(err).starts_with("Username must be between 4 and 30"));

        let mut short_password = request("alice", "a@example.com");
        short_password.password = "12345678".to_string();
        let err = service.register(short_password).await.unwrap_err();
        assert!(validation_message(err).starts_with("Password must be between 9 and 30"));
    }

    #[tokio::test]
    async fn rejects_bad_email_and_phone() {
        let service = service();
        let err = service.register(request("alice", "not-an-email")).await.unwrap_err();
        assert_eq!(validation_message(err), "Email must be a valid format");

        let mut bad_phone = request("alice", "alice@example.com");
        bad_phone.phone_number = Some("12-34".to_string());
        assert!(service.register(bad_phone).await.is_err());

        let mut good_phone = request("alice", "alice@example.com");
        good_phone.phone_number = Some("+4712345678".to_string());
        let user = service.register(good_phone).await.unwrap();
        assert_eq!(user.phone_number.as_deref(), Some("+4712345678"));
    }

    #[tokio::test]
    async fn rejects_duplicates() {
        let service = service();
        service.register(request("alice", "alice@example.com")).await.unwrap();

        let err = service.register(request("alice", "other@example.com")).await.unwrap_err();
        assert_eq!(validation_message(err), "Username already exists");

        let err = service.register(request("alice2", "alice@example.com")).await.unwrap_err();
        assert_eq!(validation_message(err), "Email already in use");
    }

    #[test]
    fn date_of_birth_rules() {
        let today = Utc::now().date_naive();
        let tomorrow = (today + Duration::days(1)).format("%Y-%m-%d").to_string();

        assert_eq!(parse_date_of_birth(None).unwrap(), None);
        assert_eq!(parse_date_of_birth(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_date_of_birth(Some("1990-05-17")).unwrap(),
            NaiveDate::from_ymd_opt(1990, 5, 17)
        );
        assert_eq!(
            validation_message(parse_date_of_birth(Some("17/05/1990")).unwrap_err()),
            "Date of birth must be in YYYY-MM-DD format"
        );
        assert_eq!(
            validation_message(parse_date_of_birth(Some(&tomorrow)).unwrap_err()),
            "Date of birth cannot be in the future"
        );
        assert_eq!(
            validation_message(parse_date_of_birth(Some("1800-01-01")).unwrap_err()),
            "Date of birth cannot be more than 120 years ago"
        );
    }

    #[tokio::test]
    async fn update_me_keeps_date_of_birth_when_omitted() {
        let service = service();
        let mut req = request("alice", "alice@example.com");
        req.date_of_birth = Some("1990-05-17".to_string());
        let user = service.register(req).await.unwrap();

        let updated = service
            .update_me(
                user.id,
                UpdateProfileRequest {
                    email: "new@example.com".to_string(),
                    phone_number: None,
                    date_of_birth: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.date_of_birth, NaiveDate::from_ymd_opt(1990, 5, 17));
    }

    #[tokio::test]
    async fn update_me_rejects_taken_email() {
        let service = service();
        let alice = service.register(request("alice", "alice@example.com")).await.unwrap();
        service.register(request("bobby", "bob@example.com")).await.unwrap();

        let err = service
            .update_me(
                alice.id,
                UpdateProfileRequest {
                    email: "bob@example.com".to_string(),
                    phone_number: None,
                    date_of_birth: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(validation_message(err), "Email already in use");
    }

    #[tokio::test]
    async fn admin_operations() {
        let service = service();
        let alice = service.register(request("alice", "alice@example.com")).await.unwrap();

        let promoted = service.update_role(alice.id, "admin").await.unwrap();
        assert_eq!(promoted.role, "ADMIN");
        assert!(matches!(service.update_role(alice.id, "root").await, Err(UserError::Validation(_))));

        assert_eq!(service.list().await.unwrap().len(), 1);
        service.delete(alice.id).await.unwrap();
        assert!(matches!(service.delete(alice.id).await, Err(UserError::NotFound(_))));
        assert!(matches!(service.me(alice.id).await, Err(UserError::NotFound(_))));
    }
}
