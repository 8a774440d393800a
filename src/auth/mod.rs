pub mod credentials;
pub mod password;
pub mod token;

pub use credentials::{CredentialError, CredentialVerifier};
pub use password::{hash_password, verify_password, PasswordError};
pub use token::{Claims, TokenError, TokenIssuer};
