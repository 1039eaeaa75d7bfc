//! Storage seams the services are written against.
//!
//! `SqliteStore` in [`crate::db`] implements all of them; the services only
//! ever see these traits, so a store can be swapped or left unconfigured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    errors::AppError,
    kinds::{RequestKind, SupportTickets},
    structs::{
        AdminCredential, Brand, BrandInput, Category, CategoryInput, Priority, Product,
        ProductInput, Service, ServiceInput,
    },
};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str)
        -> Result<Option<AdminCredential>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<AdminCredential>, AppError>;

    async fn insert_admin(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> Result<AdminCredential, AppError>;

    async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), AppError>;

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), AppError>;

    async fn set_active(&self, id: i64, is_active: bool) -> Result<(), AppError>;
}

/// Persistence for one inbound request kind.
#[async_trait]
pub trait RequestStore<K: RequestKind>: Send + Sync {
    /// Insert with the kind's initial status and `is_read = false`.
    async fn insert(&self, draft: &K::Draft) -> Result<K::Record, AppError>;

    /// Every row, newest first.
    async fn list_all(&self) -> Result<Vec<K::Record>, AppError>;

    async fn find(&self, id: i64) -> Result<Option<K::Record>, AppError>;

    async fn update_status(&self, id: i64, status: K::Status) -> Result<(), AppError>;

    async fn set_read(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait PriorityStore: RequestStore<SupportTickets> {
    async fn update_priority(&self, id: i64, priority: Priority) -> Result<(), AppError>;
}

/// Reference data owned by the admin console. Finders and lists only return
/// active rows; deletes are soft.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError>;
    async fn insert_category(&self, input: &CategoryInput) -> Result<Category, AppError>;
    async fn update_category(&self, id: i64, input: &CategoryInput) -> Result<(), AppError>;
    async fn deactivate_category(&self, id: i64) -> Result<(), AppError>;

    async fn list_brands(&self) -> Result<Vec<Brand>, AppError>;
    async fn find_brand(&self, id: i64) -> Result<Option<Brand>, AppError>;
    async fn insert_brand(&self, input: &BrandInput) -> Result<Brand, AppError>;
    async fn update_brand(&self, id: i64, input: &BrandInput) -> Result<(), AppError>;
    async fn deactivate_brand(&self, id: i64) -> Result<(), AppError>;

    async fn list_products(&self, limit: Option<i64>) -> Result<Vec<Product>, AppError>;
    async fn featured_products(&self, limit: i64) -> Result<Vec<Product>, AppError>;
    async fn find_product(&self, id: i64) -> Result<Option<Product>, AppError>;
    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>, AppError>;
    async fn insert_product(&self, input: &ProductInput) -> Result<Product, AppError>;
    async fn update_product(&self, id: i64, input: &ProductInput) -> Result<(), AppError>;
    async fn deactivate_product(&self, id: i64) -> Result<(), AppError>;

    async fn list_services(&self, limit: Option<i64>) -> Result<Vec<Service>, AppError>;
    async fn featured_services(&self, limit: i64) -> Result<Vec<Service>, AppError>;
    async fn find_service(&self, id: i64) -> Result<Option<Service>, AppError>;
    async fn find_service_by_slug(&self, slug: &str) -> Result<Option<Service>, AppError>;
    async fn insert_service(&self, input: &ServiceInput) -> Result<Service, AppError>;
    async fn update_service(&self, id: i64, input: &ServiceInput) -> Result<(), AppError>;
    async fn deactivate_service(&self, id: i64) -> Result<(), AppError>;
}
