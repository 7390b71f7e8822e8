use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{run_blocking, timestamp, Catalog};
use crate::auth::AdminUser;
use crate::domain::catalog::{Category, CategoryInput};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            note: c.note,
            created_at: timestamp(c.created_at),
            updated_at: timestamp(c.updated_at),
        }
    }
}

impl From<CategoryRequest> for CategoryInput {
    fn from(req: CategoryRequest) -> Self {
        CategoryInput {
            name: req.name,
            note: req.note,
        }
    }
}

#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories by name", body = Vec<CategoryResponse>)),
    tag = "catalog"
)]
pub async fn list_categories(catalog: Catalog) -> Result<HttpResponse, AppError> {
    let list = run_blocking(move || catalog.list_categories()).await?;
    let body: Vec<CategoryResponse> = list.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    ),
    tag = "catalog"
)]
pub async fn get_category(catalog: Catalog, path: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let category = run_blocking(move || catalog.get_category(id)).await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Name missing"),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_category(
    _admin: AdminUser,
    catalog: Catalog,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let input = CategoryInput::from(body.into_inner());
    let category = run_blocking(move || catalog.create_category(input)).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn update_category(
    _admin: AdminUser,
    catalog: Catalog,
    path: web::Path<i32>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = CategoryInput::from(body.into_inner());
    let category = run_blocking(move || catalog.update_category(id, input)).await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn delete_category(
    _admin: AdminUser,
    catalog: Catalog,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    run_blocking(move || catalog.delete_category(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
