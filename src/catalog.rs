//! Catalog management: categories, brands, products and services.

use std::{str::FromStr, sync::Arc};

use rust_decimal::Decimal;

use crate::{
    errors::{AppError, FieldErrors},
    store::CatalogStore,
    structs::{
        Brand, BrandInput, Category, CategoryInput, Product, ProductInput, Service, ServiceInput,
    },
    utils::{self, MAX_NAME_LEN},
};

pub const FEATURED_PRODUCTS: i64 = 6;
pub const FEATURED_SERVICES: i64 = 4;
const MAX_URL_LEN: usize = 500;
/// Prices are stored as `decimal(10,2)`.
const PRICE_SCALE: u32 = 2;
const MAX_PRICE_INTEGER_DIGITS: u32 = 8;

pub struct CatalogService<S: ?Sized> {
    store: Arc<S>,
    degrade_reads: bool,
}

impl<S: CatalogStore + ?Sized> CatalogService<S> {
    /// With `degrade_reads`, list reads return an empty result instead of
    /// `Unavailable` when the store is down.
    pub fn new(store: Arc<S>, degrade_reads: bool) -> Self {
        Self {
            store,
            degrade_reads,
        }
    }

    fn degrade<T>(
        &self,
        result: Result<Vec<T>, AppError>,
        what: &str,
    ) -> Result<Vec<T>, AppError> {
        match result {
            Err(AppError::Unavailable) if self.degrade_reads => {
                log::warn!("Store unavailable, returning no {}", what);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.degrade(self.store.list_categories().await, "categories")
    }

    pub async fn get_category(&self, id: i64) -> Result<Category, AppError> {
        self.store
            .find_category(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_category(&self, input: CategoryInput) -> Result<Category, AppError> {
        let input = normalize_category(input);
        validate_named(&input.name, &input.slug)?;
        self.store.insert_category(&input).await
    }

    pub async fn update_category(&self, id: i64, input: CategoryInput) -> Result<(), AppError> {
        let input = normalize_category(input);
        validate_named(&input.name, &input.slug)?;
        self.store.update_category(id, &input).await?;
        log::info!("Category {} updated", id);
        Ok(())
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), AppError> {
        self.store.deactivate_category(id).await
    }

    pub async fn list_brands(&self) -> Result<Vec<Brand>, AppError> {
        self.degrade(self.store.list_brands().await, "brands")
    }

    pub async fn get_brand(&self, id: i64) -> Result<Brand, AppError> {
        self.store.find_brand(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn create_brand(&self, input: BrandInput) -> Result<Brand, AppError> {
        let input = normalize_brand(input);
        validate_brand(&input)?;
        self.store.insert_brand(&input).await
    }

    pub async fn update_brand(&self, id: i64, input: BrandInput) -> Result<(), AppError> {
        let input = normalize_brand(input);
        validate_brand(&input)?;
        self.store.update_brand(id, &input).await?;
        log::info!("Brand {} updated", id);
        Ok(())
    }

    pub async fn delete_brand(&self, id: i64) -> Result<(), AppError> {
        self.store.deactivate_brand(id).await
    }

    /// Active products, newest first.
    pub async fn list_products(&self, limit: Option<i64>) -> Result<Vec<Product>, AppError> {
        check_limit(limit)?;
        self.degrade(self.store.list_products(limit).await, "products")
    }

    pub async fn featured_products(&self, limit: Option<i64>) -> Result<Vec<Product>, AppError> {
        check_limit(limit)?;
        let featured = self
            .store
            .featured_products(limit.unwrap_or(FEATURED_PRODUCTS))
            .await;
        self.degrade(featured, "featured products")
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, AppError> {
        self.store.find_product(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, AppError> {
        self.store
            .find_product_by_slug(slug)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product, AppError> {
        let input = self.checked_product(input).await?;
        self.store.insert_product(&input).await
    }

    pub async fn update_product(&self, id: i64, input: ProductInput) -> Result<(), AppError> {
        let input = self.checked_product(input).await?;
        self.store.update_product(id, &input).await?;
        log::info!("Product {} updated", id);
        Ok(())
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        self.store.deactivate_product(id).await
    }

    /// Normalize and validate, including that the referenced category and
    /// brand are active.
    async fn checked_product(&self, input: ProductInput) -> Result<ProductInput, AppError> {
        let mut input = ProductInput {
            name: input.name.trim().to_string(),
            slug: input.slug.trim().to_string(),
            description: utils::non_empty(input.description),
            specifications: utils::non_empty(input.specifications),
            price: utils::non_empty(input.price),
            image: utils::non_empty(input.image),
            ..input
        };

        let mut errors = FieldErrors::new();
        check_name_and_slug(&mut errors, &input.name, &input.slug);
        utils::limit(&mut errors, "image", input.image.as_deref(), MAX_URL_LEN);
        check_json(&mut errors, "specifications", input.specifications.as_deref());
        if let Some(price) = input.price.as_deref() {
            match normalize_price(price) {
                Some(normalized) => input.price = Some(normalized),
                None => errors.push(
                    "price",
                    "must be a non-negative decimal with at most 8 integer digits and 2 decimals",
                ),
            }
        }
        if self.store.find_category(input.category_id).await?.is_none() {
            errors.push("categoryId", "unknown category");
        }
        if self.store.find_brand(input.brand_id).await?.is_none() {
            errors.push("brandId", "unknown brand");
        }
        errors.into_result()?;
        Ok(input)
    }

    /// Active services, newest first.
    pub async fn list_services(&self, limit: Option<i64>) -> Result<Vec<Service>, AppError> {
        check_limit(limit)?;
        self.degrade(self.store.list_services(limit).await, "services")
    }

    pub async fn featured_services(&self, limit: Option<i64>) -> Result<Vec<Service>, AppError> {
        check_limit(limit)?;
        let featured = self
            .store
            .featured_services(limit.unwrap_or(FEATURED_SERVICES))
            .await;
        self.degrade(featured, "featured services")
    }

    pub async fn get_service(&self, id: i64) -> Result<Service, AppError> {
        self.store.find_service(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn get_service_by_slug(&self, slug: &str) -> Result<Service, AppError> {
        self.store
            .find_service_by_slug(slug)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_service(&self, input: ServiceInput) -> Result<Service, AppError> {
        let input = normalize_service(input);
        validate_service(&input)?;
        self.store.insert_service(&input).await
    }

    pub async fn update_service(&self, id: i64, input: ServiceInput) -> Result<(), AppError> {
        let input = normalize_service(input);
        validate_service(&input)?;
        self.store.update_service(id, &input).await?;
        log::info!("Service {} updated", id);
        Ok(())
    }

    pub async fn delete_service(&self, id: i64) -> Result<(), AppError> {
        self.store.deactivate_service(id).await
    }
}

fn check_limit(limit: Option<i64>) -> Result<(), AppError> {
    match limit {
        Some(n) if n < 1 => Err(AppError::InvalidInput(FieldErrors::single(
            "limit",
            "must be at least 1",
        ))),
        _ => Ok(()),
    }
}

fn check_name_and_slug(errors: &mut FieldErrors, name: &str, slug: &str) {
    utils::require(errors, "name", name, MAX_NAME_LEN);
    utils::require(errors, "slug", slug, MAX_NAME_LEN);
    if !slug.is_empty() && !utils::is_valid_slug(slug) {
        errors.push("slug", "may only contain lowercase letters, digits and dashes");
    }
}

fn check_json(errors: &mut FieldErrors, field: &'static str, value: Option<&str>) {
    if let Some(value) = value {
        if serde_json::from_str::<serde_json::Value>(value).is_err() {
            errors.push(field, "must be valid JSON");
        }
    }
}

fn validate_named(name: &str, slug: &str) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_name_and_slug(&mut errors, name, slug);
    errors.into_result()
}

fn validate_brand(input: &BrandInput) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_name_and_slug(&mut errors, &input.name, &input.slug);
    utils::limit(&mut errors, "logo", input.logo.as_deref(), MAX_URL_LEN);
    errors.into_result()
}

fn validate_service(input: &ServiceInput) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_name_and_slug(&mut errors, &input.name, &input.slug);
    utils::limit(&mut errors, "icon", input.icon.as_deref(), MAX_NAME_LEN);
    utils::limit(&mut errors, "image", input.image.as_deref(), MAX_URL_LEN);
    check_json(&mut errors, "features", input.features.as_deref());
    errors.into_result()
}

fn normalize_category(input: CategoryInput) -> CategoryInput {
    CategoryInput {
        name: input.name.trim().to_string(),
        slug: input.slug.trim().to_string(),
        description: utils::non_empty(input.description),
    }
}

fn normalize_brand(input: BrandInput) -> BrandInput {
    BrandInput {
        name: input.name.trim().to_string(),
        slug: input.slug.trim().to_string(),
        logo: utils::non_empty(input.logo),
        description: utils::non_empty(input.description),
    }
}

fn normalize_service(input: ServiceInput) -> ServiceInput {
    ServiceInput {
        name: input.name.trim().to_string(),
        slug: input.slug.trim().to_string(),
        description: utils::non_empty(input.description),
        icon: utils::non_empty(input.icon),
        image: utils::non_empty(input.image),
        features: utils::non_empty(input.features),
        is_featured: input.is_featured,
    }
}

/// Parse a non-negative decimal that fits `decimal(10,2)` and render it with
/// two places. Values that would need rounding are rejected.
pub fn normalize_price(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if !raw.chars().any(|c| c.is_ascii_digit())
        || !raw.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }
    let mut value = Decimal::from_str(raw).ok()?;
    if value.is_sign_negative() || value.normalize().scale() > PRICE_SCALE {
        return None;
    }
    if value.trunc() >= Decimal::from(10_i64.pow(MAX_PRICE_INTEGER_DIGITS)) {
        return None;
    }
    value.rescale(PRICE_SCALE);
    Some(value.to_string())
}
