use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::products::RatingResponse;
use super::{run_blocking, timestamp, Reviews};
use crate::auth::{AdminUser, AuthUser};
use crate::domain::review::{NewReview, ReviewView};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub order_id: i32,
    pub product_id: i32,
    /// 1 to 5
    pub rating: i32,
    pub comment: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateReviewResponse {
    pub review_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub product_title: Option<String>,
    /// Hidden for anonymous reviews on public listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    pub user_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_anonymous: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CanReviewResponse {
    pub can_review: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteReviewResponse {
    pub review_id: i32,
    pub product_id: i32,
    pub rating: RatingResponse,
}

impl ReviewResponse {
    fn new(view: ReviewView, public: bool) -> Self {
        Self {
            user_id: (!public || !view.is_anonymous).then_some(view.user_id),
            id: view.id,
            order_id: view.order_id,
            product_id: view.product_id,
            product_title: view.product_title,
            user_name: view.user_name,
            rating: view.rating,
            comment: view.comment,
            is_anonymous: view.is_anonymous,
            created_at: timestamp(view.created_at),
        }
    }
}

/// POST /api/reviews
///
/// Only the owner of a delivered order may review its products, once each.
/// A failed rating refresh does not undo the review and is returned as
/// `warning`.
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = CreateReviewResponse),
        (status = 400, description = "Rating out of range"),
        (status = 403, description = "Order not delivered, not the caller's, without this product, or already reviewed for it"),
        (status = 409, description = "A concurrent request stored the same review first"),
    ),
    security(("bearer_auth" = [])),
    tag = "reviews"
)]
pub async fn create_review(
    user: AuthUser,
    reviews: Reviews,
    body: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let review = NewReview {
        order_id: body.order_id,
        product_id: body.product_id,
        user_id: user.id,
        rating: body.rating,
        comment: body.comment,
        is_anonymous: body.is_anonymous,
    };

    let outcome = run_blocking(move || {
        if !reviews.can_review(review.order_id, review.product_id, review.user_id)? {
            return Ok(None);
        }
        reviews.add_review(review).map(Some)
    })
    .await?
    .ok_or_else(|| {
        AppError::Forbidden(
            "You can only review products from your own delivered orders, once".into(),
        )
    })?;

    Ok(HttpResponse::Created().json(CreateReviewResponse {
        review_id: outcome.value,
        warning: outcome.warning,
    }))
}

/// GET /api/products/{id}/reviews
///
/// Public listing, newest first. Anonymous reviewers' names are masked.
#[utoipa::path(
    get,
    path = "/api/products/{id}/reviews",
    params(("id" = i32, Path, description = "Product id")),
    responses((status = 200, description = "Reviews of the product", body = Vec<ReviewResponse>)),
    tag = "reviews"
)]
pub async fn product_reviews(reviews: Reviews, path: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let list = run_blocking(move || reviews.product_reviews(product_id)).await?;
    let body: Vec<ReviewResponse> = list
        .into_iter()
        .map(|view| ReviewResponse::new(view, true))
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/orders/{id}/reviews
///
/// The caller's reviews on one of their orders, keyed by product id.
#[utoipa::path(
    get,
    path = "/api/orders/{id}/reviews",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Reviews keyed by product id", body = BTreeMap<i32, ReviewResponse>),
    ),
    security(("bearer_auth" = [])),
    tag = "reviews"
)]
pub async fn order_reviews(
    user: AuthUser,
    reviews: Reviews,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let list = run_blocking(move || reviews.order_reviews(order_id, user.id)).await?;
    let body: BTreeMap<i32, ReviewResponse> = list
        .into_iter()
        .map(|view| (view.product_id, ReviewResponse::new(view, false)))
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/orders/{order_id}/products/{product_id}/can-review
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}/products/{product_id}/can-review",
    params(
        ("order_id" = i32, Path, description = "Order id"),
        ("product_id" = i32, Path, description = "Product id"),
    ),
    responses((status = 200, description = "Whether the caller may review", body = CanReviewResponse)),
    security(("bearer_auth" = [])),
    tag = "reviews"
)]
pub async fn can_review(
    user: AuthUser,
    reviews: Reviews,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, AppError> {
    let (order_id, product_id) = path.into_inner();
    let can_review =
        run_blocking(move || reviews.can_review(order_id, product_id, user.id)).await?;
    Ok(HttpResponse::Ok().json(CanReviewResponse { can_review }))
}

/// GET /api/reviews
#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "Every review", body = Vec<ReviewResponse>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "reviews"
)]
pub async fn list_all_reviews(_admin: AdminUser, reviews: Reviews) -> Result<HttpResponse, AppError> {
    let list = run_blocking(move || reviews.all_reviews()).await?;
    let body: Vec<ReviewResponse> = list
        .into_iter()
        .map(|view| ReviewResponse::new(view, false))
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// DELETE /api/reviews/{id}
///
/// Deletes the review and recomputes the product rating in one transaction.
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = i32, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review deleted, new product rating", body = DeleteReviewResponse),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "reviews"
)]
pub async fn delete_review(
    _admin: AdminUser,
    reviews: Reviews,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let review_id = path.into_inner();
    let deleted = run_blocking(move || reviews.delete_review(review_id)).await?;
    Ok(HttpResponse::Ok().json(DeleteReviewResponse {
        review_id: deleted.review_id,
        product_id: deleted.product_id,
        rating: RatingResponse {
            rate: deleted.rating.rate,
            count: deleted.rating.count,
        },
    }))
}
