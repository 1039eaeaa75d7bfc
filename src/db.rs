use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow},
    FromRow, SqlitePool,
};

use crate::{
    errors::AppError,
    kinds::{Contacts, Quotes, RequestKind, SupportTickets},
    store::{CatalogStore, CredentialStore, PriorityStore, RequestStore},
    structs::{
        AdminCredential, Brand, BrandInput, Category, CategoryInput, ContactStatus,
        ContactSubmission, NewContactSubmission, NewQuoteRequest, NewSupportInquiry, Priority,
        Product, ProductInput, QuoteRequest, QuoteStatus, Service, ServiceInput, SupportInquiry,
        SupportStatus,
    },
};

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .read_only(false)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(opts)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!().run(pool).await?;
    log::info!("Database migrated successfully");
    Ok(())
}

/// Store handle injected into the services. Without a pool every operation
/// fails with [`AppError::Unavailable`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Option<SqlitePool>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool: Some(pool) }
    }

    pub fn unconfigured() -> Self {
        Self { pool: None }
    }

    pub fn is_configured(&self) -> bool {
        self.pool.is_some()
    }

    fn pool(&self) -> Result<&SqlitePool, AppError> {
        self.pool.as_ref().ok_or(AppError::Unavailable)
    }
}

async fn list_newest_first<R>(pool: &SqlitePool, table: &str) -> Result<Vec<R>, AppError>
where
    R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} ORDER BY created_at DESC, id DESC", table);
    let rows = sqlx::query_as::<_, R>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

async fn find_row<R>(pool: &SqlitePool, table: &str, id: i64) -> Result<Option<R>, AppError>
where
    R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} WHERE id = $1", table);
    let row = sqlx::query_as::<_, R>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn set_column(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    id: i64,
    value: &str,
) -> Result<(), AppError> {
    let sql = format!(
        "UPDATE {} SET {} = $1, updated_at = $2 WHERE id = $3",
        table, column
    );
    let result = sqlx::query(&sql)
        .bind(value)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

async fn mark_read(pool: &SqlitePool, table: &str, id: i64) -> Result<(), AppError> {
    let sql = format!(
        "UPDATE {} SET is_read = 1, updated_at = $1 WHERE id = $2",
        table
    );
    let result = sqlx::query(&sql)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

async fn deactivate(pool: &SqlitePool, table: &str, id: i64) -> Result<(), AppError> {
    let sql = format!(
        "UPDATE {} SET is_active = 0, updated_at = $1 WHERE id = $2",
        table
    );
    let result = sqlx::query(&sql)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    log::info!("{} with id {} deactivated", table, id);
    Ok(())
}

async fn find_active<R>(pool: &SqlitePool, table: &str, id: i64) -> Result<Option<R>, AppError>
where
    R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} WHERE id = $1 AND is_active = 1", table);
    let row = sqlx::query_as::<_, R>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn find_active_by_slug<R>(
    pool: &SqlitePool,
    table: &str,
    slug: &str,
) -> Result<Option<R>, AppError>
where
    R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} WHERE slug = $1 AND is_active = 1", table);
    let row = sqlx::query_as::<_, R>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

fn ensure_updated(rows_affected: u64) -> Result<(), AppError> {
    if rows_affected == 0 {
        Err(AppError::NotFound)
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredential>, AppError> {
        let pool = self.pool()?;
        let credential = sqlx::query_as::<_, AdminCredential>(
            "SELECT * FROM admin_credentials WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;
        Ok(credential)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AdminCredential>, AppError> {
        find_row(self.pool()?, "admin_credentials", id).await
    }

    async fn insert_admin(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> Result<AdminCredential, AppError> {
        let pool = self.pool()?;
        let created_at = Utc::now();
        let credential = sqlx::query_as::<_, AdminCredential>(
            "INSERT INTO admin_credentials (username, password_hash, email, is_active, created_at, updated_at) VALUES ($1, $2, $3, 1, $4, $5) RETURNING *",
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        log::info!("Admin created: {}", credential.username);
        Ok(credential)
    }

    async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), AppError> {
        let pool = self.pool()?;
        let result = sqlx::query("UPDATE admin_credentials SET last_login = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(pool)
            .await?;
        ensure_updated(result.rows_affected())
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), AppError> {
        set_column(self.pool()?, "admin_credentials", "password_hash", id, password_hash).await
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<(), AppError> {
        let pool = self.pool()?;
        let result = sqlx::query(
            "UPDATE admin_credentials SET is_active = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(is_active)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
        ensure_updated(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Inbound requests
// ---------------------------------------------------------------------------

#[async_trait]
impl RequestStore<Quotes> for SqliteStore {
    async fn insert(&self, draft: &NewQuoteRequest) -> Result<QuoteRequest, AppError> {
        let pool = self.pool()?;
        let created_at = Utc::now();
        let quote = sqlx::query_as::<_, QuoteRequest>(
            "INSERT INTO quote_requests (product_id, customer_name, customer_email, customer_phone, company_name, quantity, message, status, is_read, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $10) RETURNING *",
        )
        .bind(draft.product_id)
        .bind(&draft.customer_name)
        .bind(&draft.customer_email)
        .bind(&draft.customer_phone)
        .bind(&draft.company_name)
        .bind(draft.quantity)
        .bind(&draft.message)
        .bind(Quotes::initial_status().as_str())
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        Ok(quote)
    }

    async fn list_all(&self) -> Result<Vec<QuoteRequest>, AppError> {
        list_newest_first(self.pool()?, "quote_requests").await
    }

    async fn find(&self, id: i64) -> Result<Option<QuoteRequest>, AppError> {
        find_row(self.pool()?, "quote_requests", id).await
    }

    async fn update_status(&self, id: i64, status: QuoteStatus) -> Result<(), AppError> {
        set_column(self.pool()?, "quote_requests", "status", id, status.as_str()).await
    }

    async fn set_read(&self, id: i64) -> Result<(), AppError> {
        mark_read(self.pool()?, "quote_requests", id).await
    }
}

#[async_trait]
impl RequestStore<Contacts> for SqliteStore {
    async fn insert(&self, draft: &NewContactSubmission) -> Result<ContactSubmission, AppError> {
        let pool = self.pool()?;
        let created_at = Utc::now();
        let contact = sqlx::query_as::<_, ContactSubmission>(
            "INSERT INTO contact_submissions (name, email, phone, subject, message, status, is_read, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8) RETURNING *",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.subject)
        .bind(&draft.message)
        .bind(Contacts::initial_status().as_str())
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        Ok(contact)
    }

    async fn list_all(&self) -> Result<Vec<ContactSubmission>, AppError> {
        list_newest_first(self.pool()?, "contact_submissions").await
    }

    async fn find(&self, id: i64) -> Result<Option<ContactSubmission>, AppError> {
        find_row(self.pool()?, "contact_submissions", id).await
    }

    async fn update_status(&self, id: i64, status: ContactStatus) -> Result<(), AppError> {
        set_column(self.pool()?, "contact_submissions", "status", id, status.as_str()).await
    }

    async fn set_read(&self, id: i64) -> Result<(), AppError> {
        mark_read(self.pool()?, "contact_submissions", id).await
    }
}

#[async_trait]
impl RequestStore<SupportTickets> for SqliteStore {
    async fn insert(&self, draft: &NewSupportInquiry) -> Result<SupportInquiry, AppError> {
        let pool = self.pool()?;
        let created_at = Utc::now();
        let inquiry = sqlx::query_as::<_, SupportInquiry>(
            "INSERT INTO support_inquiries (name, email, phone, subject, message, priority, status, is_read, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9) RETURNING *",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.subject)
        .bind(&draft.message)
        .bind(draft.priority.unwrap_or_default().as_str())
        .bind(SupportTickets::initial_status().as_str())
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        Ok(inquiry)
    }

    async fn list_all(&self) -> Result<Vec<SupportInquiry>, AppError> {
        list_newest_first(self.pool()?, "support_inquiries").await
    }

    async fn find(&self, id: i64) -> Result<Option<SupportInquiry>, AppError> {
        find_row(self.pool()?, "support_inquiries", id).await
    }

    async fn update_status(&self, id: i64, status: SupportStatus) -> Result<(), AppError> {
        set_column(self.pool()?, "support_inquiries", "status", id, status.as_str()).await
    }

    async fn set_read(&self, id: i64) -> Result<(), AppError> {
        mark_read(self.pool()?, "support_inquiries", id).await
    }
}

#[async_trait]
impl PriorityStore for SqliteStore {
    async fn update_priority(&self, id: i64, priority: Priority) -> Result<(), AppError> {
        set_column(self.pool()?, "support_inquiries", "priority", id, priority.as_str()).await
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let pool = self.pool()?;
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(pool)
        .await?;
        Ok(categories)
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        find_active(self.pool()?, "categories", id).await
    }

    async fn insert_category(&self, input: &CategoryInput) -> Result<Category, AppError> {
        let pool = self.pool()?;
        let created_at = Utc::now();
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug, description, created_at, updated_at) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        log::info!("Category created: {}", category.slug);
        Ok(category)
    }

    async fn update_category(&self, id: i64, input: &CategoryInput) -> Result<(), AppError> {
        let pool = self.pool()?;
        let result = sqlx::query(
            "UPDATE categories SET name = $1, slug = $2, description = $3, updated_at = $4 WHERE id = $5",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
        ensure_updated(result.rows_affected())
    }

    async fn deactivate_category(&self, id: i64) -> Result<(), AppError> {
        deactivate(self.pool()?, "categories", id).await
    }

    async fn list_brands(&self) -> Result<Vec<Brand>, AppError> {
        let pool = self.pool()?;
        let brands =
            sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE is_active = 1 ORDER BY name")
                .fetch_all(pool)
                .await?;
        Ok(brands)
    }

    async fn find_brand(&self, id: i64) -> Result<Option<Brand>, AppError> {
        find_active(self.pool()?, "brands", id).await
    }

    async fn insert_brand(&self, input: &BrandInput) -> Result<Brand, AppError> {
        let pool = self.pool()?;
        let created_at = Utc::now();
        let brand = sqlx::query_as::<_, Brand>(
            "INSERT INTO brands (name, slug, logo, description, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.logo)
        .bind(&input.description)
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        log::info!("Brand created: {}", brand.slug);
        Ok(brand)
    }

    async fn update_brand(&self, id: i64, input: &BrandInput) -> Result<(), AppError> {
        let pool = self.pool()?;
        let result = sqlx::query(
            "UPDATE brands SET name = $1, slug = $2, logo = $3, description = $4, updated_at = $5 WHERE id = $6",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.logo)
        .bind(&input.description)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
        ensure_updated(result.rows_affected())
    }

    async fn deactivate_brand(&self, id: i64) -> Result<(), AppError> {
        deactivate(self.pool()?, "brands", id).await
    }

    async fn list_products(&self, limit: Option<i64>) -> Result<Vec<Product>, AppError> {
        let pool = self.pool()?;
        // sqlite treats a negative LIMIT as unbounded
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE is_active = 1 ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;
        Ok(products)
    }

    async fn featured_products(&self, limit: i64) -> Result<Vec<Product>, AppError> {
        let pool = self.pool()?;
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE is_active = 1 AND is_featured = 1 ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(products)
    }

    async fn find_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        find_active(self.pool()?, "products", id).await
    }

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>, AppError> {
        find_active_by_slug(self.pool()?, "products", slug).await
    }

    async fn insert_product(&self, input: &ProductInput) -> Result<Product, AppError> {
        let pool = self.pool()?;
        let created_at = Utc::now();
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, slug, description, specifications, category_id, brand_id, price, image, is_featured, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.specifications)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.price)
        .bind(&input.image)
        .bind(input.is_featured.unwrap_or(false))
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        log::info!("Product created: {}", product.slug);
        Ok(product)
    }

    async fn update_product(&self, id: i64, input: &ProductInput) -> Result<(), AppError> {
        let pool = self.pool()?;
        let result = sqlx::query(
            "UPDATE products SET name = $1, slug = $2, description = $3, specifications = $4, category_id = $5, brand_id = $6, price = $7, image = $8, is_featured = COALESCE($9, is_featured), updated_at = $10 WHERE id = $11",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.specifications)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.price)
        .bind(&input.image)
        .bind(input.is_featured)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
        ensure_updated(result.rows_affected())
    }

    async fn deactivate_product(&self, id: i64) -> Result<(), AppError> {
        deactivate(self.pool()?, "products", id).await
    }

    async fn list_services(&self, limit: Option<i64>) -> Result<Vec<Service>, AppError> {
        let pool = self.pool()?;
        let services = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE is_active = 1 ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;
        Ok(services)
    }

    async fn featured_services(&self, limit: i64) -> Result<Vec<Service>, AppError> {
        let pool = self.pool()?;
        let services = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE is_active = 1 AND is_featured = 1 ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(services)
    }

    async fn find_service(&self, id: i64) -> Result<Option<Service>, AppError> {
        find_active(self.pool()?, "services", id).await
    }

    async fn find_service_by_slug(&self, slug: &str) -> Result<Option<Service>, AppError> {
        find_active_by_slug(self.pool()?, "services", slug).await
    }

    async fn insert_service(&self, input: &ServiceInput) -> Result<Service, AppError> {
        let pool = self.pool()?;
        let created_at = Utc::now();
        let service = sqlx::query_as::<_, Service>(
            "INSERT INTO services (name, slug, description, icon, image, features, is_featured, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.image)
        .bind(&input.features)
        .bind(input.is_featured.unwrap_or(false))
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        log::info!("Service created: {}", service.slug);
        Ok(service)
    }

    async fn update_service(&self, id: i64, input: &ServiceInput) -> Result<(), AppError> {
        let pool = self.pool()?;
        let result = sqlx::query(
            "UPDATE services SET name = $1, slug = $2, description = $3, icon = $4, image = $5, features = $6, is_featured = COALESCE($7, is_featured), updated_at = $8 WHERE id = $9",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.image)
        .bind(&input.features)
        .bind(input.is_featured)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
        ensure_updated(result.rows_affected())
    }

    async fn deactivate_service(&self, id: i64) -> Result<(), AppError> {
        deactivate(self.pool()?, "services", id).await
    }
}

#[cfg(test)]
pub(crate) async fn test_store() -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    SqliteStore::new(pool)
}
