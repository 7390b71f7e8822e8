pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::{AccountService, CartService, CatalogService, OrderService, ReviewService};
use auth::JwtKeys;
use domain::errors::DomainError;
use infrastructure::{
    DieselCartRepository, DieselCatalogRepository, DieselOrderRepository, DieselReviewRepository,
    DieselUserRepository,
};

pub use config::Config;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DomainError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DomainError::Internal(format!("migrations failed: {e}")))?;
    for version in applied {
        log::info!("Applied migration {}", version);
    }
    Ok(())
}

pub fn account_service(pool: &DbPool, config: &Config) -> AccountService<DieselUserRepository> {
    AccountService::new(
        DieselUserRepository::new(pool.clone()),
        JwtKeys::new(&config.jwt_secret, config.jwt_ttl_hours),
        config.bcrypt_cost,
    )
}

/// Creates or promotes the admin account named in the configuration.
pub fn bootstrap_admin(pool: &DbPool, config: &Config) -> Result<(), DomainError> {
    if let Some(admin) = &config.admin {
        let user = account_service(pool, config).ensure_admin(&admin.email, &admin.password)?;
        log::info!("Admin account ready: {}", user.email);
    }
    Ok(())
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    config: &Config,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let keys = web::Data::new(JwtKeys::new(&config.jwt_secret, config.jwt_ttl_hours));
    let orders = web::Data::new(OrderService::new(DieselOrderRepository::new(pool.clone())));
    let reviews = web::Data::new(ReviewService::new(DieselReviewRepository::new(pool.clone())));
    let catalog = web::Data::new(CatalogService::new(DieselCatalogRepository::new(pool.clone())));
    let carts = web::Data::new(CartService::new(DieselCartRepository::new(pool.clone())));
    let accounts = web::Data::new(account_service(&pool, config));
    let pool = web::Data::new(pool);
    let openapi = handlers::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(keys.clone())
            .app_data(orders.clone())
            .app_data(reviews.clone())
            .app_data(catalog.clone())
            .app_data(carts.clone())
            .app_data(accounts.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(handlers::configure)
    })
    .bind((host.to_string(), port))?
    .run())
}
