//! Admin authentication: credential checks, password changes, provisioning.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    errors::{AppError, FieldErrors},
    store::CredentialStore,
    structs::SessionInfo,
    utils::{self, PasswordHashing},
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MAX_USERNAME_LEN: usize = 100;

pub struct AuthService<S: ?Sized> {
    store: Arc<S>,
    hashing: PasswordHashing,
}

impl<S: CredentialStore + ?Sized> AuthService<S> {
    pub fn new(store: Arc<S>, hashing: PasswordHashing) -> Self {
        Self { store, hashing }
    }

    /// Verify a username/password pair and stamp `last_login`.
    ///
    /// Unknown users and wrong passwords fail identically. A disabled account
    /// is only reported once the password has been proven correct. Nothing is
    /// written unless the login succeeds.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Unauthenticated);
        }

        let admin = match self.store.find_by_username(username).await? {
            Some(admin) => admin,
            None => {
                self.hashing.verify_dummy_blocking(password).await?;
                log::warn!("Failed login for unknown username");
                return Err(AppError::Unauthenticated);
            }
        };

        if !self
            .hashing
            .verify_password_blocking(password, &admin.password_hash)
            .await?
        {
            log::warn!("Failed login for admin ID: {}", admin.id);
            return Err(AppError::Unauthenticated);
        }

        if !admin.is_active {
            log::warn!("Login attempt on inactive admin ID: {}", admin.id);
            return Err(AppError::Forbidden);
        }

        self.store.update_last_login(admin.id, Utc::now()).await?;
        log::info!("Admin {} logged in", admin.username);

        Ok(SessionInfo {
            admin_id: admin.id,
            username: admin.username,
            email: admin.email,
        })
    }

    /// Replace the password of `admin_id` after re-checking its current one.
    pub async fn change_password(
        &self,
        admin_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let admin = self
            .store
            .find_by_id(admin_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !self
            .hashing
            .verify_password_blocking(current_password, &admin.password_hash)
            .await?
        {
            log::warn!("Old password verification failed for admin ID: {}", admin.id);
            return Err(AppError::Unauthenticated);
        }

        validate_password(new_password)?;

        let new_hash = self.hashing.hash_password_blocking(new_password).await?;
        self.store.update_password_hash(admin.id, &new_hash).await?;
        log::info!("Password changed successfully for admin ID: {}", admin.id);
        Ok(())
    }

    /// Create a new admin credential.
    pub async fn provision_admin(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<SessionInfo, AppError> {
        let mut errors = FieldErrors::new();
        utils::require(&mut errors, "username", username, MAX_USERNAME_LEN);
        utils::require_email(&mut errors, "email", email);
        errors.into_result()?;
        validate_password(password)?;

        let hash = self.hashing.hash_password_blocking(password).await?;
        let admin = self.store.insert_admin(username, &hash, email).await?;
        Ok(SessionInfo {
            admin_id: admin.id,
            username: admin.username,
            email: admin.email,
        })
    }

    /// Create the admin only if the username is free. Returns whether one was created.
    pub async fn ensure_admin(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        if self.store.find_by_username(username).await?.is_some() {
            return Ok(false);
        }
        self.provision_admin(username, password, email).await?;
        Ok(true)
    }

    /// Soft-disable or re-enable an admin.
    pub async fn set_active(&self, admin_id: i64, is_active: bool) -> Result<(), AppError> {
        self.store.set_active(admin_id, is_active).await?;
        log::info!("Admin ID {} active = {}", admin_id, is_active);
        Ok(())
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(FieldErrors::single(
            "newPassword",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::InvalidInput(FieldErrors::single(
            "newPassword",
            format!("must be at most {} characters", MAX_PASSWORD_LEN),
        )));
    }
    Ok(())
}
