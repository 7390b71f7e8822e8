pub mod accounts;
pub mod cart;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;

use actix_web::web;
use chrono::NaiveDateTime;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::application::{AccountService, CartService, CatalogService, OrderService, ReviewService};
use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::infrastructure::{
    DieselCartRepository, DieselCatalogRepository, DieselOrderRepository, DieselReviewRepository,
    DieselUserRepository,
};

pub type Orders = web::Data<OrderService<DieselOrderRepository>>;
pub type Reviews = web::Data<ReviewService<DieselReviewRepository>>;
pub type Catalog = web::Data<CatalogService<DieselCatalogRepository>>;
pub type Accounts = web::Data<AccountService<DieselUserRepository>>;
pub type Carts = web::Data<CartService<DieselCartRepository>>;

/// Runs a synchronous service call on the blocking thread pool.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??)
}

pub(crate) fn timestamp(at: NaiveDateTime) -> String {
    at.and_utc().to_rfc3339()
}

/// Registers every route of the API on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(accounts::register))
        .route("/login", web::post().to(accounts::login))
        .route("/profile", web::get().to(accounts::get_profile))
        .route("/profile", web::put().to(accounts::update_profile))
        .route("/change-password", web::put().to(accounts::change_password))
        .route("/products", web::get().to(products::list_products))
        .route("/products", web::post().to(products::create_product))
        .route("/products/{id}", web::get().to(products::get_product))
        .route("/products/{id}", web::put().to(products::update_product))
        .route("/products/{id}", web::delete().to(products::delete_product))
        .route("/categories", web::get().to(categories::list_categories))
        .route("/categories", web::post().to(categories::create_category))
        .route("/categories/{id}", web::get().to(categories::get_category))
        .route("/categories/{id}", web::put().to(categories::update_category))
        .route("/categories/{id}", web::delete().to(categories::delete_category))
        .route("/cart", web::get().to(cart::get_cart))
        .route("/cart", web::put().to(cart::save_cart))
        .route("/cart", web::delete().to(cart::clear_cart))
        .route("/check-stock", web::post().to(orders::check_stock))
        .route("/orders", web::post().to(orders::create_order))
        .route("/orders", web::get().to(orders::list_my_orders))
        .route("/orders/{id}", web::get().to(orders::get_order))
        .service(
            web::scope("/admin")
                .route("/users", web::get().to(accounts::list_users))
                .route("/users/{id}", web::delete().to(accounts::delete_user))
                .route("/users/{id}/role", web::put().to(accounts::set_role))
                .route("/orders", web::get().to(orders::list_all_orders))
                .route("/orders/{id}", web::put().to(orders::update_order_status))
                .route(
                    "/products/{id}/stock-movements",
                    web::get().to(orders::stock_movements),
                ),
        )
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health))
                .route("/reviews", web::post().to(reviews::create_review))
                .route("/reviews", web::get().to(reviews::list_all_reviews))
                .route("/reviews/{id}", web::delete().to(reviews::delete_review))
                .route(
                    "/products/{id}/reviews",
                    web::get().to(reviews::product_reviews),
                )
                .route("/orders/{id}/reviews", web::get().to(reviews::order_reviews))
                .route(
                    "/orders/{order_id}/products/{product_id}/can-review",
                    web::get().to(reviews::can_review),
                ),
        );
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Storefront API"),
    paths(
        accounts::register,
        accounts::login,
        accounts::get_profile,
        accounts::update_profile,
        accounts::change_password,
        accounts::list_users,
        accounts::delete_user,
        accounts::set_role,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        cart::get_cart,
        cart::save_cart,
        cart::clear_cart,
        orders::check_stock,
        orders::create_order,
        orders::list_my_orders,
        orders::get_order,
        orders::list_all_orders,
        orders::update_order_status,
        orders::stock_movements,
        reviews::create_review,
        reviews::product_reviews,
        reviews::order_reviews,
        reviews::can_review,
        reviews::list_all_reviews,
        reviews::delete_review,
        health::health,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "accounts", description = "Registration, login and user administration"),
        (name = "catalog", description = "Products and categories"),
        (name = "cart", description = "Per-user shopping cart"),
        (name = "orders", description = "Checkout, order status and stock ledger"),
        (name = "reviews", description = "Product reviews and ratings"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/orders",
            "/admin/orders/{id}",
            "/check-stock",
            "/api/reviews",
            "/admin/products/{id}/stock-movements",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn duplicate_review_is_documented_as_forbidden() {
        use utoipa::openapi::RefOr;

        let doc = ApiDoc::openapi();
        let post = doc.paths.paths["/api/reviews"]
            .post
            .as_ref()
            .expect("POST /api/reviews");
        let Some(RefOr::T(forbidden)) = post.responses.responses.get("403") else {
            panic!("403 response missing");
        };
        assert!(
            forbidden.description.contains("already reviewed"),
            "{}",
            forbidden.description
        );
    }
}
