use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by every bearer token the auth service issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token is bound to
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Malformed token")]
    Malformed,
    #[error("Token encoding failed: {0}")]
    Encoding(jsonwebtoken::errors::Error),
}

/// Signs and verifies HS256 tokens with a key that lives only as long as the process.
///
/// Restarting the issuer invalidates every outstanding token. There is no
/// revocation list: a token stays valid until `exp` regardless of logout.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    const KEY_LEN: usize = 32;

    /// Build an issuer with a freshly generated random key.
    pub fn generate(lifetime_minutes: i64) -> Self {
        let mut secret = [0u8; Self::KEY_LEN];
        OsRng.fill_bytes(&mut secret);
        Self::from_secret(&secret, lifetime_minutes)
    }

    pub fn from_secret(secret: &[u8], lifetime_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime: Duration::minutes(lifetime_minutes),
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(TokenError::Encoding)
    }

    /// Verify signature and expiry, returning the username the token was issued for.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        Ok(data.claims.sub)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime_secs", &self.lifetime_secs())
            .finish_non_exhaustive()
    }
}
