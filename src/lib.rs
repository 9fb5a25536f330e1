pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod infrastructure;
pub mod schema;

use std::error::Error;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::basket_service::BasketService;
use errors::AppError;
use handlers::ApiDoc;
use infrastructure::diesel_store::DieselStore;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migrations", applied.len());
    Ok(())
}

/// Registers every route of the service. The app must provide a
/// `web::Data<BasketService>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::resource("/basket")
            .route(web::get().to(handlers::basket::get_basket))
            .route(web::post().to(handlers::basket::add_items))
            .route(web::put().to(handlers::basket::update_items))
            .route(web::delete().to(handlers::basket::remove_items)),
    )
    .service(
        web::resource("/orders")
            .route(web::get().to(handlers::orders::list_my_orders))
            .route(web::post().to(handlers::orders::place_order)),
    )
    .route(
        "/partner/orders",
        web::get().to(handlers::orders::list_supplier_orders),
    )
    .route("/products", web::get().to(handlers::catalog::list_offers))
    .route("/shops", web::get().to(handlers::catalog::list_shops));
}

/// Build and return an actix-web `Server` bound to `host:port`, serving
/// `service`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_service_server(
    service: BasketService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
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

/// [`build_service_server`] backed by PostgreSQL.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = BasketService::new(Arc::new(DieselStore::new(pool)));
    build_service_server(service, host, port)
}
