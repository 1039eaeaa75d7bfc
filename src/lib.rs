#[macro_use]
extern crate lazy_static;

use std::sync::Arc;

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod kinds;
pub mod lifecycle;
pub mod notify;
pub mod routes;
pub mod session;
pub mod store;
pub mod structs;
pub mod utils;

use auth::AuthService;
use catalog::CatalogService;
use db::SqliteStore;
use lifecycle::RequestLifecycle;
use notify::Notifier;
use utils::PasswordHashing;

/// Services shared by every worker. All of them hold the same store handle.
pub struct AppState {
    pub auth: AuthService<SqliteStore>,
    pub requests: RequestLifecycle<SqliteStore>,
    pub catalog: CatalogService<SqliteStore>,
    pub database_configured: bool,
}

impl AppState {
    pub fn new(
        store: Arc<SqliteStore>,
        hashing: PasswordHashing,
        notifier: Arc<dyn Notifier>,
        notify_recipient: &str,
        degrade_reads: bool,
    ) -> Self {
        Self {
            database_configured: store.is_configured(),
            auth: AuthService::new(store.clone(), hashing),
            requests: RequestLifecycle::new(
                store.clone(),
                notifier,
                notify_recipient,
                degrade_reads,
            ),
            catalog: CatalogService::new(store, degrade_reads),
        }
    }
}
