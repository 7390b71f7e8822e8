use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{run_blocking, timestamp, Orders};
use crate::application::StockLedger;
use crate::auth::{AdminUser, AuthUser};
use crate::domain::order::{
    OrderItemInput, OrderItemView, OrderStatus, OrderView, StatusChange, StockCheck,
    StockCheckLine, StockRequest,
};
use crate::domain::stock::StockMovementView;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckStockRequest {
    pub items: Vec<StockItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockCheckLineResponse {
    pub product_id: i32,
    /// Absent when the product does not exist.
    pub title: Option<String>,
    pub requested: i32,
    pub available: Option<i32>,
    pub valid: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockCheckResponse {
    pub is_valid: bool,
    pub results: Vec<StockCheckLineResponse>,
    pub out_of_stock_items: Vec<StockCheckLineResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: i32,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub shipping_name: String,
    pub shipping_address: String,
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub title: Option<String>,
    pub image: Option<String>,
    pub quantity: i32,
    /// Price paid per unit, fixed when the order was placed.
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub shipping_name: String,
    pub shipping_address: String,
    pub status: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of pending, paid, shipped, delivered, cancelled.
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockMovementResponse {
    pub id: i32,
    pub product_id: i32,
    pub order_id: Option<i32>,
    pub quantity: i32,
    pub movement_type: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChangeResponse {
    pub id: i32,
    pub previous_status: String,
    pub status: String,
    pub movements: Vec<StockMovementResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockLedgerResponse {
    pub product_id: i32,
    pub movements: Vec<StockMovementResponse>,
    pub total_in: i64,
    pub total_out: i64,
    /// `total_in - total_out`
    pub net: i64,
}

impl From<&StockCheckLine> for StockCheckLineResponse {
    fn from(line: &StockCheckLine) -> Self {
        Self {
            product_id: line.product_id,
            title: line.title.clone(),
            requested: line.requested,
            available: line.available,
            valid: line.valid,
        }
    }
}

impl From<StockCheck> for StockCheckResponse {
    fn from(check: StockCheck) -> Self {
        Self {
            is_valid: check.is_valid,
            out_of_stock_items: check.out_of_stock().map(Into::into).collect(),
            results: check.results.iter().map(Into::into).collect(),
        }
    }
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            title: item.product_title,
            image: item.product_image,
            quantity: item.quantity,
            price: item.price.to_string(),
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            user_email: order.user_email,
            shipping_name: order.shipping_name,
            shipping_address: order.shipping_address,
            status: order.status.to_string(),
            created_at: timestamp(order.created_at),
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<StockMovementView> for StockMovementResponse {
    fn from(m: StockMovementView) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            order_id: m.order_id,
            quantity: m.quantity,
            movement_type: m.movement_type.to_string(),
            created_at: timestamp(m.created_at),
        }
    }
}

impl From<StockLedger> for StockLedgerResponse {
    fn from(ledger: StockLedger) -> Self {
        Self {
            product_id: ledger.product_id,
            total_in: ledger.summary.total_in,
            total_out: ledger.summary.total_out,
            net: ledger.summary.net(),
            movements: ledger.movements.into_iter().map(Into::into).collect(),
        }
    }
}

fn status_change_response(change: StatusChange, warning: Option<String>) -> StatusChangeResponse {
    StatusChangeResponse {
        id: change.order_id,
        previous_status: change.previous.to_string(),
        status: change.status.to_string(),
        movements: change.movements.into_iter().map(Into::into).collect(),
        warning,
    }
}

fn parse_items(items: Vec<CreateOrderItemRequest>) -> Result<Vec<OrderItemInput>, AppError> {
    items
        .into_iter()
        .map(|item| {
            let price = BigDecimal::from_str(item.price.trim()).map_err(|e| {
                AppError::BadRequest(format!("Invalid price '{}': {}", item.price, e))
            })?;
            Ok(OrderItemInput {
                product_id: item.product_id,
                quantity: item.quantity,
                price,
            })
        })
        .collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /check-stock
///
/// Advisory comparison of requested quantities against current stock. Nothing
/// is reserved; `POST /orders` checks again before committing.
#[utoipa::path(
    post,
    path = "/check-stock",
    request_body = CheckStockRequest,
    responses(
        (status = 200, description = "Per-item availability", body = StockCheckResponse),
        (status = 400, description = "Empty item list or non-positive quantity"),
    ),
    tag = "orders"
)]
pub async fn check_stock(
    orders: Orders,
    body: web::Json<CheckStockRequest>,
) -> Result<HttpResponse, AppError> {
    let items: Vec<StockRequest> = body
        .into_inner()
        .items
        .into_iter()
        .map(|i| StockRequest {
            product_id: i.product_id,
            quantity: i.quantity,
        })
        .collect();

    let check = run_blocking(move || orders.check_stock(items)).await?;
    Ok(HttpResponse::Ok().json(StockCheckResponse::from(check)))
}

/// POST /orders
///
/// Places an order for the authenticated user. Stock is re-verified and
/// decremented in the same transaction that inserts the order and its items;
/// on any failure nothing is written.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Invalid order"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown product"),
        (status = 409, description = "Insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn create_order(
    user: AuthUser,
    orders: Orders,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let items = parse_items(body.items)?;

    let order_id = run_blocking(move || {
        orders.create_order(user.id, &body.shipping_name, &body.shipping_address, items)
    })
    .await?;

    Ok(HttpResponse::Created().json(CreateOrderResponse { id: order_id }))
}

/// GET /orders
///
/// The caller's orders with their items, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders of the caller", body = Vec<OrderResponse>),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_my_orders(user: AuthUser, orders: Orders) -> Result<HttpResponse, AppError> {
    let list = run_blocking(move || orders.list_user_orders(user.id)).await?;
    let body: Vec<OrderResponse> = list.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    user: AuthUser,
    orders: Orders,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = run_blocking(move || orders.get_order(order_id)).await?;

    if order.user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden("Access denied".into()));
    }
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /admin/orders
#[utoipa::path(
    get,
    path = "/admin/orders",
    responses(
        (status = 200, description = "All orders with the owner's email", body = Vec<OrderResponse>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_all_orders(_admin: AdminUser, orders: Orders) -> Result<HttpResponse, AppError> {
    let list = run_blocking(move || orders.list_all_orders()).await?;
    let body: Vec<OrderResponse> = list.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /admin/orders/{id}
///
/// Sets the order status. Entering `paid` takes the items out of stock and
/// going from `paid` to `cancelled` puts them back, each logged as a stock
/// movement. Other transitions only change the status.
#[utoipa::path(
    put,
    path = "/admin/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = StatusChangeResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Not enough stock to mark the order paid"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    admin: AdminUser,
    orders: Orders,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status = OrderStatus::from_str(body.status.trim())?;
    log::info!(
        "Admin {} sets order {} to {}",
        admin.0.id,
        order_id,
        status
    );

    let outcome = run_blocking(move || orders.update_order_status(order_id, status)).await?;
    Ok(HttpResponse::Ok().json(status_change_response(outcome.value, outcome.warning)))
}

/// GET /admin/products/{id}/stock-movements
#[utoipa::path(
    get,
    path = "/admin/products/{id}/stock-movements",
    params(
        ("id" = i32, Path, description = "Product id"),
    ),
    responses(
        (status = 200, description = "Movement log, oldest first", body = StockLedgerResponse),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn stock_movements(
    _admin: AdminUser,
    orders: Orders,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let ledger = run_blocking(move || orders.stock_ledger(product_id)).await?;
    Ok(HttpResponse::Ok().json(StockLedgerResponse::from(ledger)))
}
