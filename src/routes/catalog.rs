use actix_web::{
    delete, get, post, put,
    web::{self, Data},
    HttpResponse, Responder,
};
use serde::Deserialize;

use crate::{
    errors::AppError,
    session::AdminSession,
    structs::{BrandInput, CategoryInput, ProductInput, ServiceInput},
    AppState,
};

use super::success;

#[derive(Deserialize)]
pub struct ListQuery {
    limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Public reads
// ---------------------------------------------------------------------------

#[get("/api/products")]
pub async fn list_products(
    state: Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let products = state.catalog.list_products(query.limit).await?;
    Ok(HttpResponse::Ok().json(products))
}

#[get("/api/products/featured")]
pub async fn featured_products(
    state: Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let products = state.catalog.featured_products(query.limit).await?;
    Ok(HttpResponse::Ok().json(products))
}

#[get("/api/products/slug/{slug}")]
pub async fn product_by_slug(
    state: Data<AppState>,
    slug: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let product = state.catalog.get_product_by_slug(&slug).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[get("/api/products/{id}")]
pub async fn get_product(
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let product = state.catalog.get_product(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[get("/api/services")]
pub async fn list_services(
    state: Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let services = state.catalog.list_services(query.limit).await?;
    Ok(HttpResponse::Ok().json(services))
}

#[get("/api/services/featured")]
pub async fn featured_services(
    state: Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let services = state.catalog.featured_services(query.limit).await?;
    Ok(HttpResponse::Ok().json(services))
}

#[get("/api/services/slug/{slug}")]
pub async fn service_by_slug(
    state: Data<AppState>,
    slug: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let service = state.catalog.get_service_by_slug(&slug).await?;
    Ok(HttpResponse::Ok().json(service))
}

#[get("/api/services/{id}")]
pub async fn get_service(
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let service = state.catalog.get_service(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(service))
}

#[get("/api/categories")]
pub async fn list_categories(state: Data<AppState>) -> Result<impl Responder, AppError> {
    let categories = state.catalog.list_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[get("/api/categories/{id}")]
pub async fn get_category(
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let category = state.catalog.get_category(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category))
}

#[get("/api/brands")]
pub async fn list_brands(state: Data<AppState>) -> Result<impl Responder, AppError> {
    let brands = state.catalog.list_brands().await?;
    Ok(HttpResponse::Ok().json(brands))
}

#[get("/api/brands/{id}")]
pub async fn get_brand(
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let brand = state.catalog.get_brand(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(brand))
}

// ---------------------------------------------------------------------------
// Admin writes
// ---------------------------------------------------------------------------

#[post("/api/admin/categories")]
pub async fn create_category(
    _admin: AdminSession,
    state: Data<AppState>,
    web::Json(input): web::Json<CategoryInput>,
) -> Result<impl Responder, AppError> {
    let category = state.catalog.create_category(input).await?;
    Ok(HttpResponse::Created().json(category))
}

#[put("/api/admin/categories/{id}")]
pub async fn update_category(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
    web::Json(input): web::Json<CategoryInput>,
) -> Result<impl Responder, AppError> {
    state.catalog.update_category(id.into_inner(), input).await?;
    Ok(success())
}

#[delete("/api/admin/categories/{id}")]
pub async fn delete_category(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.catalog.delete_category(id.into_inner()).await?;
    Ok(success())
}

#[post("/api/admin/brands")]
pub async fn create_brand(
    _admin: AdminSession,
    state: Data<AppState>,
    web::Json(input): web::Json<BrandInput>,
) -> Result<impl Responder, AppError> {
    let brand = state.catalog.create_brand(input).await?;
    Ok(HttpResponse::Created().json(brand))
}

#[put("/api/admin/brands/{id}")]
pub async fn update_brand(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
    web::Json(input): web::Json<BrandInput>,
) -> Result<impl Responder, AppError> {
    state.catalog.update_brand(id.into_inner(), input).await?;
    Ok(success())
}

#[delete("/api/admin/brands/{id}")]
pub async fn delete_brand(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.catalog.delete_brand(id.into_inner()).await?;
    Ok(success())
}

#[post("/api/admin/products")]
pub async fn create_product(
    _admin: AdminSession,
    state: Data<AppState>,
    web::Json(input): web::Json<ProductInput>,
) -> Result<impl Responder, AppError> {
    let product = state.catalog.create_product(input).await?;
    Ok(HttpResponse::Created().json(product))
}

#[put("/api/admin/products/{id}")]
pub async fn update_product(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
    web::Json(input): web::Json<ProductInput>,
) -> Result<impl Responder, AppError> {
    state.catalog.update_product(id.into_inner(), input).await?;
    Ok(success())
}

#[delete("/api/admin/products/{id}")]
pub async fn delete_product(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.catalog.delete_product(id.into_inner()).await?;
    Ok(success())
}

#[post("/api/admin/services")]
pub async fn create_service(
    _admin: AdminSession,
    state: Data<AppState>,
    web::Json(input): web::Json<ServiceInput>,
) -> Result<impl Responder, AppError> {
    let service = state.catalog.create_service(input).await?;
    Ok(HttpResponse::Created().json(service))
}

#[put("/api/admin/services/{id}")]
pub async fn update_service(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
    web::Json(input): web::Json<ServiceInput>,
) -> Result<impl Responder, AppError> {
    state.catalog.update_service(id.into_inner(), input).await?;
    Ok(success())
}

#[delete("/api/admin/services/{id}")]
pub async fn delete_service(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.catalog.delete_service(id.into_inner()).await?;
    Ok(success())
}
