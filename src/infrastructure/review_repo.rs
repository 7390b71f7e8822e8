use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::DbPool;
use crate::domain::errors::{DomainError, Outcome};
use crate::domain::order::OrderStatus;
use crate::domain::ports::ReviewRepository;
use crate::domain::review::{mask_name, DeletedReview, NewReview, RatingSummary, ReviewView};
use crate::schema::{order_items, orders, products, reviews, users};

use super::models::{NewReviewRow, ReviewRow};

pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Recomputes `rating_rate` / `rating_count` of a product from its reviews.
pub(super) fn refresh_rating(conn: &mut SqliteConnection, product_id: i32) -> Result<RatingSummary, DomainError> {
    let ratings: Vec<i32> = reviews::table
        .filter(reviews::product_id.eq(product_id))
        .select(reviews::rating)
        .load(conn)?;
    let summary = RatingSummary::from_ratings(&ratings);

    let updated = diesel::update(products::table.find(product_id))
        .set((
            products::rating_rate.eq(summary.rate),
            products::rating_count.eq(summary.count),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(DomainError::not_found("Product", product_id));
    }
    Ok(summary)
}

fn already_reviewed(
    conn: &mut SqliteConnection,
    order_id: i32,
    product_id: i32,
    user_id: i32,
) -> Result<bool, DomainError> {
    Ok(diesel::select(exists(
        reviews::table
            .filter(reviews::order_id.eq(order_id))
            .filter(reviews::product_id.eq(product_id))
            .filter(reviews::user_id.eq(user_id)),
    ))
    .get_result(conn)?)
}

enum Scope {
    Product(i32),
    Order { order_id: i32, user_id: i32 },
    All,
}

fn load_views(conn: &mut SqliteConnection, scope: Scope) -> Result<Vec<ReviewView>, DomainError> {
    let query = reviews::table
        .inner_join(users::table)
        .inner_join(products::table)
        .select((ReviewRow::as_select(), users::name, products::title))
        .order((reviews::created_at.desc(), reviews::id.desc()))
        .into_boxed();

    // Anonymous reviewers are only masked on the public product listing.
    let (query, mask) = match scope {
        Scope::Product(product_id) => (query.filter(reviews::product_id.eq(product_id)), true),
        Scope::Order { order_id, user_id } => (
            query
                .filter(reviews::order_id.eq(order_id))
                .filter(reviews::user_id.eq(user_id)),
            false,
        ),
        Scope::All => (query, false),
    };

    let rows: Vec<(ReviewRow, String, String)> = query.load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(review, name, title)| ReviewView {
            user_name: if mask && review.is_anonymous {
                mask_name(&name)
            } else {
                name
            },
            id: review.id,
            order_id: review.order_id,
            product_id: review.product_id,
            product_title: Some(title),
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            is_anonymous: review.is_anonymous,
            created_at: review.created_at,
        })
        .collect())
}

impl ReviewRepository for DieselReviewRepository {
    fn can_review(
        &self,
        order_id: i32,
        product_id: i32,
        user_id: i32,
    ) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let order: Option<(i32, String)> = orders::table
            .find(order_id)
            .select((orders::user_id, orders::status))
            .first(&mut conn)
            .optional()?;
        let Some((owner, status)) = order else {
            return Ok(false);
        };
        if status != OrderStatus::Delivered.as_str() {
            return Ok(false);
        }

        let contains_product: bool = diesel::select(exists(
            order_items::table
                .filter(order_items::order_id.eq(order_id))
                .filter(order_items::product_id.eq(product_id)),
        ))
        .get_result(&mut conn)?;
        if !contains_product || owner != user_id {
            return Ok(false);
        }

        Ok(!already_reviewed(&mut conn, order_id, product_id, user_id)?)
    }

    fn add(&self, review: NewReview) -> Result<Outcome<i32>, DomainError> {
        let mut conn = self.pool.get()?;

        let product_exists: bool =
            diesel::select(exists(products::table.find(review.product_id)))
                .get_result(&mut conn)?;
        if !product_exists {
            return Err(DomainError::not_found("Product", review.product_id));
        }
        if already_reviewed(&mut conn, review.order_id, review.product_id, review.user_id)? {
            return Err(DomainError::Conflict(format!(
                "product {} was already reviewed for order {}",
                review.product_id, review.order_id
            )));
        }

        let review_id: i32 = diesel::insert_into(reviews::table)
            .values(&NewReviewRow {
                order_id: review.order_id,
                product_id: review.product_id,
                user_id: review.user_id,
                rating: review.rating,
                comment: review.comment.as_deref(),
                is_anonymous: review.is_anonymous,
            })
            .returning(reviews::id)
            .get_result(&mut conn)?;

        match refresh_rating(&mut conn, review.product_id) {
            Ok(_) => Ok(Outcome::ok(review_id)),
            Err(e) => {
                log::warn!(
                    "Review {} saved but rating of product {} not refreshed: {}",
                    review_id,
                    review.product_id,
                    e
                );
                Ok(Outcome::with_warning(
                    review_id,
                    "review saved but the product rating could not be updated",
                ))
            }
        }
    }

    fn delete(&self, review_id: i32) -> Result<DeletedReview, DomainError> {
        let mut conn = self.pool.get()?;

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            let product_id: i32 = reviews::table
                .find(review_id)
                .select(reviews::product_id)
                .first(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Review", review_id))?;

            diesel::delete(reviews::table.find(review_id)).execute(conn)?;
            let rating = refresh_rating(conn, product_id)?;

            Ok(DeletedReview {
                review_id,
                product_id,
                rating,
            })
        })
    }

    fn list_for_product(&self, product_id: i32) -> Result<Vec<ReviewView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_views(&mut conn, Scope::Product(product_id))
    }

    fn list_for_order(&self, order_id: i32, user_id: i32) -> Result<Vec<ReviewView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_views(&mut conn, Scope::Order { order_id, user_id })
    }

    fn list_all(&self) -> Result<Vec<ReviewView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_views(&mut conn, Scope::All)
    }
}
