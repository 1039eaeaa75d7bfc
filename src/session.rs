//! Admin session handling on top of actix-identity and actix-session.
//!
//! Expiry is enforced by the identity middleware (login and visit deadlines)
//! and the persistent cookie TTL, so no session table is kept.

use std::future::{ready, Ready};

use actix_identity::{Identity, IdentityExt};
use actix_session::SessionExt;
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};

use crate::{errors::AppError, structs::SessionInfo};

const ADMIN_KEY: &str = "admin";

/// Extractor for handlers that need a logged-in admin. Rejects with 401.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionInfo);

impl FromRequest for AdminSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(current_admin(req).map(AdminSession))
    }
}

fn current_admin(req: &HttpRequest) -> Result<SessionInfo, AppError> {
    let identity = req
        .get_identity()
        .map_err(|_| AppError::Unauthenticated)?;
    let id = identity.id().map_err(|_| AppError::Unauthenticated)?;

    let info = req
        .get_session()
        .get::<SessionInfo>(ADMIN_KEY)
        .map_err(|e| AppError::SessionError(e.to_string()))?
        .ok_or(AppError::Unauthenticated)?;

    // both are written at login, so they must agree
    if info.admin_id.to_string() != id {
        log::warn!("Session payload does not match identity {}", id);
        return Err(AppError::Unauthenticated);
    }
    Ok(info)
}

/// Attach a fresh session for a successfully authenticated admin.
pub fn begin(req: &HttpRequest, info: &SessionInfo) -> Result<(), AppError> {
    let session = req.get_session();
    session.renew();
    session
        .insert(ADMIN_KEY, info)
        .map_err(|e| AppError::SessionError(e.to_string()))?;
    Identity::login(&req.extensions(), info.admin_id.to_string())
        .map_err(|e| AppError::SessionError(e.to_string()))?;
    Ok(())
}

/// Drop the identity and everything stored alongside it.
pub fn end(req: &HttpRequest) {
    match req.get_identity() {
        Ok(identity) => identity.logout(),
        Err(_) => req.get_session().purge(),
    }
}
