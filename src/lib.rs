pub mod api_doc;
pub mod application;
pub mod config;
pub mod context;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::error::Error;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::errors::AppError;

pub use context::AppContext;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("Applied {} migration(s)", applied.len());
    }
    Ok(())
}

/// The console's route table, without the documentation endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/auth")
            .route("/login", web::post().to(handlers::auth::login))
            .route("/forgot-password", web::post().to(handlers::auth::forgot_password))
            .route("/logout", web::post().to(handlers::auth::logout))
            .route("/session", web::get().to(handlers::auth::current_session)),
    )
    .service(
        web::scope("/dashboard")
            .route("/stats", web::get().to(handlers::dashboard::stat_cards))
            .route("/sales", web::get().to(handlers::dashboard::monthly_sales))
            .route("/customers", web::get().to(handlers::dashboard::customers)),
    )
    .service(
        web::scope("/orders")
            .route("", web::get().to(handlers::orders::list_orders))
            .route("/{id}", web::get().to(handlers::orders::get_order))
            .route("/{id}/status", web::put().to(handlers::orders::update_status)),
    )
    .service(
        web::scope("/products")
            .route("", web::get().to(handlers::products::list_products))
            .route("", web::post().to(handlers::products::create_product))
            .route("/{id}", web::get().to(handlers::products::get_product))
            .route("/{id}", web::put().to(handlers::products::update_product))
            .route("/{id}", web::delete().to(handlers::products::delete_product))
            .route("/{id}/reviews", web::get().to(handlers::products::list_reviews))
            .route("/{id}/reviews", web::post().to(handlers::products::add_review)),
    )
    .service(
        web::scope("/users")
            .route("", web::get().to(handlers::users::list_users))
            .route("/admins", web::post().to(handlers::users::create_admin))
            .route("/{id}/blocked", web::put().to(handlers::users::set_blocked))
            .route("/{id}", web::delete().to(handlers::users::delete_user)),
    )
    .route("/uploads/{key:.*}", web::get().to(handlers::uploads::get_upload));
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    ctx: AppContext,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let ctx = web::Data::new(ctx);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(ctx.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
