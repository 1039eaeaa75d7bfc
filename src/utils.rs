use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use actix_web::web;

use crate::errors::{AppError, FieldErrors};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 320;
pub const MAX_PHONE_LEN: usize = 20;

/// Argon2id hasher shared by every credential operation.
#[derive(Clone)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
    // verified against when the username is unknown so both failure paths cost the same
    dummy_hash: String,
}

impl PasswordHashing {
    pub fn new() -> Result<Self, AppError> {
        Self::from_argon2(Argon2::default())
    }

    /// Cheap parameters for tests.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AppError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AppError::PasswordError(e.to_string()))?;
        Self::from_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Result<Self, AppError> {
        let dummy_hash = hash_with(&argon2, "not-a-real-password")?;
        Ok(Self { argon2, dummy_hash })
    }

    /// Hash with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        hash_with(&self.argon2, password)
    }

    pub fn verify_password(&self, provided: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(provided.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                log::error!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }

    /// Burn one verification for a username that does not exist.
    pub fn verify_dummy(&self, provided: &str) {
        let _ = self.verify_password(provided, &self.dummy_hash);
    }

    // Same operations, run on actix's blocking thread pool.

    pub async fn hash_password_blocking(&self, password: &str) -> Result<String, AppError> {
        let hashing = self.clone();
        let password = password.to_owned();
        web::block(move || hashing.hash_password(&password))
            .await
            .map_err(|e| AppError::PasswordError(e.to_string()))?
    }

    pub async fn verify_password_blocking(
        &self,
        provided: &str,
        stored_hash: &str,
    ) -> Result<bool, AppError> {
        let hashing = self.clone();
        let provided = provided.to_owned();
        let stored_hash = stored_hash.to_owned();
        web::block(move || hashing.verify_password(&provided, &stored_hash))
            .await
            .map_err(|e| AppError::PasswordError(e.to_string()))
    }

    pub async fn verify_dummy_blocking(&self, provided: &str) -> Result<(), AppError> {
        let hashing = self.clone();
        let provided = provided.to_owned();
        web::block(move || hashing.verify_dummy(&provided))
            .await
            .map_err(|e| AppError::PasswordError(e.to_string()))
    }
}

fn hash_with(argon2: &Argon2<'static>, password: &str) -> Result<String, AppError> {
    argon2
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
        .map(|hash| hash.to_string())
        .map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            AppError::PasswordError(e.to_string())
        })
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub fn require(errors: &mut FieldErrors, field: &'static str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        errors.push(field, "is required");
    } else if value.chars().count() > max_len {
        errors.push(field, format!("must be at most {} characters", max_len));
    }
}

pub fn limit(errors: &mut FieldErrors, field: &'static str, value: Option<&str>, max_len: usize) {
    if let Some(value) = value {
        if value.chars().count() > max_len {
            errors.push(field, format!("must be at most {} characters", max_len));
        }
    }
}

pub fn require_email(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "is required");
    } else if value.len() > MAX_EMAIL_LEN {
        errors.push(field, format!("must be at most {} characters", MAX_EMAIL_LEN));
    } else if !is_valid_email(value) {
        errors.push(field, "is not a valid email address");
    }
}

/// Empty optional strings are stored as NULL.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
pub(crate) fn test_hashing() -> PasswordHashing {
    PasswordHashing::with_params(1024, 1, 1).expect("argon2 params")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trip_and_fresh_salt() {
        let hashing = test_hashing();
        let first = hashing.hash_password("correct horse").unwrap();
        let second = hashing.hash_password("correct horse").unwrap();
        assert_ne!(first, second);
        assert!(hashing.verify_password("correct horse", &first));
        assert!(!hashing.verify_password("wrong horse", &first));
    }

    #[actix_web::test]
    async fn blocking_pool_hashes_agree_with_inline_ones() {
        let hashing = test_hashing();
        let hash = hashing.hash_password_blocking("correct horse").await.unwrap();
        assert!(hashing.verify_password("correct horse", &hash));
        assert!(hashing
            .verify_password_blocking("correct horse", &hash)
            .await
            .unwrap());
        assert!(!hashing
            .verify_password_blocking("wrong horse", &hash)
            .await
            .unwrap());
        hashing.verify_dummy_blocking("anything").await.unwrap();
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let hashing = test_hashing();
        assert!(!hashing.verify_password("anything", "plaintext"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@acme.com"));
        assert!(is_valid_email("first.last@sub.example.np"));
        assert!(!is_valid_email("acme.com"));
        assert!(!is_valid_email("@acme.com"));
        assert!(!is_valid_email("a@acme"));
        assert!(!is_valid_email("a@@acme.com"));
        assert!(!is_valid_email("a b@acme.com"));
    }

    #[test]
    fn slug_shapes() {
        assert!(is_valid_slug("dell-latitude-5440"));
        assert!(!is_valid_slug("Dell"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(""));
    }
}
