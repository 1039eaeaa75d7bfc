mod admin;
mod catalog;
mod public;

use actix_web::{
    get,
    web::{self, Data},
    HttpResponse, Responder,
};

use crate::{
    errors::{AppError, FieldErrors},
    kinds::{Contacts, Quotes, SupportTickets},
    AppState,
};

/// Register every endpoint. Literal paths go before `{id}` patterns on the same prefix.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::InvalidInput(FieldErrors::single("body", err.to_string())).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|_, _| AppError::NotFound.into()))
    .service(health)
    // public submissions
    .service(public::create_quote)
    .service(public::create_contact)
    .service(public::create_support)
    // public catalog
    .service(catalog::list_products)
    .service(catalog::featured_products)
    .service(catalog::product_by_slug)
    .service(catalog::get_product)
    .service(catalog::list_services)
    .service(catalog::featured_services)
    .service(catalog::service_by_slug)
    .service(catalog::get_service)
    .service(catalog::list_categories)
    .service(catalog::get_category)
    .service(catalog::list_brands)
    .service(catalog::get_brand)
    // admin
    .service(admin::login)
    .service(admin::logout)
    .service(admin::me)
    .service(admin::change_password)
    .service(admin::update_priority)
    .service(catalog::create_category)
    .service(catalog::update_category)
    .service(catalog::delete_category)
    .service(catalog::create_brand)
    .service(catalog::update_brand)
    .service(catalog::delete_brand)
    .service(catalog::create_product)
    .service(catalog::update_product)
    .service(catalog::delete_product)
    .service(catalog::create_service)
    .service(catalog::update_service)
    .service(catalog::delete_service);

    admin::request_routes::<Quotes>(cfg);
    admin::request_routes::<Contacts>(cfg);
    admin::request_routes::<SupportTickets>(cfg);
}

pub(crate) fn success() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}

#[get("/health")]
async fn health(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "database": if state.database_configured { "configured" } else { "unconfigured" },
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_identity::IdentityMiddleware;
    use actix_session::{storage::CookieSessionStore, SessionMiddleware};
    use actix_web::{
        cookie::{Cookie, Key},
        http::StatusCode,
        test, App,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        db::{test_store, SqliteStore},
        notify::testing::RecordingNotifier,
        utils,
    };

    async fn state_with_admin(store: SqliteStore) -> (Data<AppState>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(
            Arc::new(store),
            utils::test_hashing(),
            notifier.clone(),
            "owner@techbucket.example",
            true,
        );
        if state.database_configured {
            state
                .auth
                .provision_admin("admin", "s3cret-pass", "admin@techbucket.example")
                .await
                .unwrap();
        }
        (Data::new(state), notifier)
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .wrap(IdentityMiddleware::default())
                    .wrap(
                        SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                            .cookie_secure(false)
                            .build(),
                    )
                    .app_data($state.clone())
                    .configure(configure),
            )
            .await
        };
    }

    fn session_cookie<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
        resp.response()
            .cookies()
            .find(|c| c.name() == "id")
            .map(|c| c.into_owned())
            .expect("session cookie")
    }

    fn quote_body() -> Value {
        json!({
            "customerName": "Acme",
            "customerEmail": "a@acme.com",
            "customerPhone": "555",
            "quantity": 2
        })
    }

    #[actix_web::test]
    async fn health_reports_store_state() {
        let (state, _) = state_with_admin(SqliteStore::unconfigured()).await;
        let app = app!(state);
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["database"], "unconfigured");
    }

    #[actix_web::test]
    async fn admin_routes_need_a_session() {
        let (state, _) = state_with_admin(test_store().await).await;
        let app = app!(state);
        for uri in ["/api/admin/quotes", "/api/admin/contacts/1", "/api/admin/me"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/admin/support/1/priority")
                .set_json(json!({ "priority": "high" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn wrong_password_is_generic_401() {
        let (state, _) = state_with_admin(test_store().await).await;
        let app = app!(state);
        for (username, password) in [("admin", "nope-nope"), ("ghost", "s3cret-pass")] {
            let resp = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/admin/login")
                    .set_json(json!({ "username": username, "password": password }))
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Invalid credentials");
        }
    }

    #[actix_web::test]
    async fn quote_flow_through_admin_console() {
        let (state, notifier) = state_with_admin(test_store().await).await;
        let app = app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/quotes")
                .set_json(quote_body())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["status"], "pending");
        assert_eq!(created["isRead"], false);
        assert_eq!(notifier.sent().len(), 1);
        let id = created["id"].as_i64().unwrap();

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/login")
                .set_json(json!({ "username": "admin", "password": "s3cret-pass" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["username"], "admin");

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/admin/quotes")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let listed: Value = test::read_body_json(resp).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/admin/quotes/{}/status", id))
                .cookie(cookie.clone())
                .set_json(json!({ "status": "reviewed" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/admin/quotes/{}/status", id))
                .cookie(cookie.clone())
                .set_json(json!({ "status": "in_progress" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/admin/quotes/{}", id))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let viewed: Value = test::read_body_json(resp).await;
        assert_eq!(viewed["status"], "reviewed");
        assert_eq!(viewed["isRead"], true);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cleared = session_cookie(&resp);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/admin/me")
                .cookie(cleared)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn invalid_submission_is_400_with_fields() {
        let (state, notifier) = state_with_admin(test_store().await).await;
        let app = app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/contacts")
                .set_json(json!({
                    "name": "",
                    "email": "nope",
                    "subject": "Hi",
                    "message": "Hello"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"email"));
        assert!(notifier.sent().is_empty());

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/support")
                .insert_header(("content-type", "application/json"))
                .set_payload("{not json")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn change_password_uses_session_admin() {
        let (state, _) = state_with_admin(test_store().await).await;
        let app = app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/login")
                .set_json(json!({ "username": "admin", "password": "s3cret-pass" }))
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&resp);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/change-password")
                .cookie(cookie.clone())
                .set_json(json!({ "currentPassword": "wrong", "newPassword": "brand-new-pass" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/change-password")
                .cookie(cookie)
                .set_json(json!({
                    "currentPassword": "s3cret-pass",
                    "newPassword": "brand-new-pass"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/login")
                .set_json(json!({ "username": "admin", "password": "brand-new-pass" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn catalog_written_by_admin_is_public() {
        let (state, _) = state_with_admin(test_store().await).await;
        let app = app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/login")
                .set_json(json!({ "username": "admin", "password": "s3cret-pass" }))
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&resp);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/services")
                .cookie(cookie.clone())
                .set_json(json!({
                    "name": "Managed Backup",
                    "slug": "managed-backup",
                    "features": "[\"daily\"]",
                    "isFeatured": true
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/services/featured")
                .to_request(),
        )
        .await;
        let featured: Value = test::read_body_json(resp).await;
        assert_eq!(featured[0]["slug"], "managed-backup");

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/services/slug/managed-backup")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/products/999").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/services")
                .set_json(json!({ "name": "Anon", "slug": "anon" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/products?limit=0")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"][0]["field"], "limit");
    }

    #[actix_web::test]
    async fn unconfigured_store_rejects_writes() {
        let (state, _) = state_with_admin(SqliteStore::unconfigured()).await;
        let app = app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/quotes")
                .set_json(quote_body())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/login")
                .set_json(json!({ "username": "admin", "password": "s3cret-pass" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        // catalog reads degrade to empty lists
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/products").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([]));
    }
}
