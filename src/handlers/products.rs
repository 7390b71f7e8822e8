use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{run_blocking, Catalog};
use crate::auth::AdminUser;
use crate::domain::catalog::{Product, ProductInput};
use crate::errors::AppError;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductsQuery {
    /// Only list products with this category label.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct RatingResponse {
    pub rate: f64,
    pub count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub stock_quantity: i32,
    pub rating: RatingResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub image: Option<String>,
    /// Decimal price as a string, e.g. "19.90"
    pub price: String,
    #[serde(default)]
    pub stock_quantity: i32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            image: p.image_or_placeholder().to_string(),
            id: p.id,
            title: p.title,
            description: p.description,
            category: p.category,
            price: p.price.to_string(),
            stock_quantity: p.stock_quantity,
            rating: RatingResponse {
                rate: p.rating_rate,
                count: p.rating_count,
            },
        }
    }
}

impl TryFrom<ProductRequest> for ProductInput {
    type Error = AppError;

    fn try_from(req: ProductRequest) -> Result<Self, Self::Error> {
        let price = BigDecimal::from_str(req.price.trim())
            .map_err(|e| AppError::BadRequest(format!("Invalid price '{}': {}", req.price, e)))?;
        Ok(ProductInput {
            title: req.title,
            description: req.description,
            category: req.category,
            image: req.image,
            price,
            stock_quantity: req.stock_quantity,
        })
    }
}

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    params(ProductsQuery),
    responses(
        (status = 200, description = "Product list", body = Vec<ProductResponse>),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    catalog: Catalog,
    query: web::Query<ProductsQuery>,
) -> Result<HttpResponse, AppError> {
    let category = query.into_inner().category;
    let products = run_blocking(move || catalog.list_products(category.as_deref())).await?;
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product(catalog: Catalog, path: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = run_blocking(move || catalog.get_product(id)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_product(
    _admin: AdminUser,
    catalog: Catalog,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let input = ProductInput::try_from(body.into_inner())?;
    let product = run_blocking(move || catalog.create_product(input)).await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid product"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn update_product(
    _admin: AdminUser,
    catalog: Catalog,
    path: web::Path<i32>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = ProductInput::try_from(body.into_inner())?;
    let product = run_blocking(move || catalog.update_product(id, input)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
///
/// Refused with 409 while order items still reference the product.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product is part of existing orders"),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn delete_product(
    _admin: AdminUser,
    catalog: Catalog,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    run_blocking(move || catalog.delete_product(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
