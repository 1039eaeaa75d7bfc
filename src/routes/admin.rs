//! Admin console endpoints. Everything except login requires [`AdminSession`].

use actix_web::{
    get, post, put,
    web::{self, Data},
    HttpRequest, HttpResponse, Responder,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    db::SqliteStore,
    errors::AppError,
    kinds::RequestKind,
    session::{self, AdminSession},
    store::RequestStore,
    structs::{Priority, SessionInfo},
    AppState,
};

use super::success;

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    #[serde(flatten)]
    admin: SessionInfo,
}

#[post("/api/admin/login")]
pub async fn login(
    state: Data<AppState>,
    request: HttpRequest,
    web::Json(form): web::Json<LoginForm>,
) -> Result<impl Responder, AppError> {
    let admin = state.auth.login(&form.username, &form.password).await?;
    session::begin(&request, &admin)?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        admin,
    }))
}

#[post("/api/admin/logout")]
pub async fn logout(request: HttpRequest) -> impl Responder {
    session::end(&request);
    success()
}

#[get("/api/admin/me")]
pub async fn me(AdminSession(admin): AdminSession) -> impl Responder {
    HttpResponse::Ok().json(admin)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    current_password: String,
    new_password: String,
}

/// The target admin always comes from the session, never from the body.
#[post("/api/admin/change-password")]
pub async fn change_password(
    AdminSession(admin): AdminSession,
    state: Data<AppState>,
    web::Json(form): web::Json<ChangePasswordForm>,
) -> Result<impl Responder, AppError> {
    state
        .auth
        .change_password(admin.admin_id, &form.current_password, &form.new_password)
        .await?;
    Ok(success())
}

#[derive(Deserialize)]
pub struct StatusUpdate<T> {
    status: T,
}

#[derive(Deserialize)]
pub struct PriorityUpdate {
    priority: Priority,
}

/// Register list/view/status/read routes for one request kind under
/// `/api/admin/{tab}`.
pub fn request_routes<K>(cfg: &mut web::ServiceConfig)
where
    K: RequestKind,
    K::Status: DeserializeOwned,
    SqliteStore: RequestStore<K>,
{
    let base = format!("/api/admin/{}", K::KIND.admin_tab());
    cfg.service(web::resource(base.clone()).route(web::get().to(list_requests::<K>)))
        .service(
            web::resource(format!("{}/{{id}}", base)).route(web::get().to(view_request::<K>)),
        )
        .service(
            web::resource(format!("{}/{{id}}/status", base))
                .route(web::put().to(update_status::<K>)),
        )
        .service(
            web::resource(format!("{}/{{id}}/read", base)).route(web::post().to(mark_read::<K>)),
        );
}

async fn list_requests<K>(
    _admin: AdminSession,
    state: Data<AppState>,
) -> Result<HttpResponse, AppError>
where
    K: RequestKind,
    SqliteStore: RequestStore<K>,
{
    let records = state.requests.list::<K>().await?;
    Ok(HttpResponse::Ok().json(records))
}

async fn view_request<K>(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError>
where
    K: RequestKind,
    SqliteStore: RequestStore<K>,
{
    let record = state.requests.view::<K>(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

async fn update_status<K>(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
    web::Json(update): web::Json<StatusUpdate<K::Status>>,
) -> Result<HttpResponse, AppError>
where
    K: RequestKind,
    K::Status: DeserializeOwned,
    SqliteStore: RequestStore<K>,
{
    state
        .requests
        .update_status::<K>(id.into_inner(), update.status)
        .await?;
    Ok(success())
}

async fn mark_read<K>(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError>
where
    K: RequestKind,
    SqliteStore: RequestStore<K>,
{
    state.requests.mark_as_read::<K>(id.into_inner()).await?;
    Ok(success())
}

#[put("/api/admin/support/{id}/priority")]
pub async fn update_priority(
    _admin: AdminSession,
    state: Data<AppState>,
    id: web::Path<i64>,
    web::Json(update): web::Json<PriorityUpdate>,
) -> Result<impl Responder, AppError> {
    state
        .requests
        .update_priority(id.into_inner(), update.priority)
        .await?;
    Ok(success())
}
