use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{run_blocking, Carts};
use crate::auth::AuthUser;
use crate::domain::cart::CartItem;
use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItemDto {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartDto {
    pub items: Vec<CartItemDto>,
}

impl From<Vec<CartItem>> for CartDto {
    fn from(items: Vec<CartItem>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|i| CartItemDto {
                    product_id: i.product_id,
                    quantity: i.quantity,
                })
                .collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The caller's cart", body = CartDto),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn get_cart(user: AuthUser, carts: Carts) -> Result<HttpResponse, AppError> {
    let items = run_blocking(move || carts.get_cart(user.id)).await?;
    Ok(HttpResponse::Ok().json(CartDto::from(items)))
}

/// PUT /cart
///
/// Replaces the whole cart. Repeated products are merged.
#[utoipa::path(
    put,
    path = "/cart",
    request_body = CartDto,
    responses(
        (status = 200, description = "Cart saved", body = CartDto),
        (status = 400, description = "Non-positive quantity"),
        (status = 404, description = "Unknown product"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn save_cart(
    user: AuthUser,
    carts: Carts,
    body: web::Json<CartDto>,
) -> Result<HttpResponse, AppError> {
    let items: Vec<CartItem> = body
        .into_inner()
        .items
        .into_iter()
        .map(|i| CartItem {
            product_id: i.product_id,
            quantity: i.quantity,
        })
        .collect();
    let saved = run_blocking(move || carts.save_cart(user.id, items)).await?;
    Ok(HttpResponse::Ok().json(CartDto::from(saved)))
}

#[utoipa::path(
    delete,
    path = "/cart",
    responses((status = 204, description = "Cart emptied")),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn clear_cart(user: AuthUser, carts: Carts) -> Result<HttpResponse, AppError> {
    run_blocking(move || carts.clear_cart(user.id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
