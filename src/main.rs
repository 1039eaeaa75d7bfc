use std::sync::Arc;

use actix_identity::IdentityMiddleware;
use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::{
    cookie::time,
    http::Method,
    middleware,
    web::{self, Data},
    App, HttpResponse, HttpServer, Responder,
};
use log::info;

use reseller_console::{
    config::AppConfig,
    db::{self, SqliteStore},
    errors::AppError,
    notify::LogNotifier,
    routes,
    utils::PasswordHashing,
    AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        log::error!("FATAL: {}", e);
        std::process::exit(1);
    });

    let store = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            SqliteStore::new(pool)
        }
        None => {
            log::warn!("DATABASE_URL not set, running without a store");
            SqliteStore::unconfigured()
        }
    };

    let state = Data::new(AppState::new(
        Arc::new(store),
        PasswordHashing::new()?,
        Arc::new(LogNotifier),
        &config.notify_recipient,
        config.degrade_reads,
    ));

    if let Some(admin) = &config.bootstrap_admin {
        match state
            .auth
            .ensure_admin(&admin.username, &admin.password, &admin.email)
            .await
        {
            Ok(true) => info!("Bootstrap admin {} created", admin.username),
            Ok(false) => info!("Bootstrap admin {} already present", admin.username),
            Err(AppError::Unavailable) => log::warn!("Skipping bootstrap admin, no store"),
            Err(e) => return Err(e.into()),
        }
    }

    let addr = config.socket_addr();
    info!("Starting HTTP server on http://{}/", addr);

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            .wrap(
                IdentityMiddleware::builder()
                    .login_deadline(Some(std::time::Duration::from_secs(
                        config.session_ttl_minutes as u64 * 60,
                    )))
                    .visit_deadline(Some(std::time::Duration::from_secs(
                        config.session_idle_minutes as u64 * 60,
                    )))
                    .build(),
            )
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), config.session_key())
                    .cookie_secure(config.cookie_secure)
                    .session_lifecycle(
                        PersistentSession::default()
                            .session_ttl(time::Duration::minutes(config.session_ttl_minutes)),
                    )
                    .build(),
            )
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
            .default_service(web::to(default_handler))
    })
    .bind(addr)?
    .run()
    .await
}

async fn default_handler(req_method: Method) -> impl Responder {
    match req_method {
        Method::GET => HttpResponse::NotFound().json(serde_json::json!({ "error": "Not found" })),
        _ => HttpResponse::MethodNotAllowed().finish(),
    }
}
