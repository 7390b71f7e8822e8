use crate::domain::errors::{DomainError, Outcome};
use crate::domain::ports::ReviewRepository;
use crate::domain::review::{DeletedReview, NewReview, ReviewView};

pub struct ReviewService<R> {
    repo: R,
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn can_review(
        &self,
        order_id: i32,
        product_id: i32,
        user_id: i32,
    ) -> Result<bool, DomainError> {
        self.repo.can_review(order_id, product_id, user_id)
    }

    /// Stores the review. Callers must have checked [`Self::can_review`].
    pub fn add_review(&self, review: NewReview) -> Result<Outcome<i32>, DomainError> {
        let review = review.validate()?;
        let (order_id, product_id) = (review.order_id, review.product_id);

        let outcome = self.repo.add(review).map_err(|e| {
            if let DomainError::Conflict(_) = e {
                log::warn!("Duplicate review for order {} product {}", order_id, product_id);
            }
            e
        })?;
        log::info!(
            "Review {} added for product {} (order {})",
            outcome.value,
            product_id,
            order_id
        );
        Ok(outcome)
    }

    pub fn delete_review(&self, review_id: i32) -> Result<DeletedReview, DomainError> {
        let deleted = self.repo.delete(review_id)?;
        log::info!(
            "Review {} deleted, product {} now rated {} over {} review(s)",
            deleted.review_id,
            deleted.product_id,
            deleted.rating.rate,
            deleted.rating.count
        );
        Ok(deleted)
    }

    pub fn product_reviews(&self, product_id: i32) -> Result<Vec<ReviewView>, DomainError> {
        self.repo.list_for_product(product_id)
    }

    pub fn order_reviews(&self, order_id: i32, user_id: i32) -> Result<Vec<ReviewView>, DomainError> {
        self.repo.list_for_order(order_id, user_id)
    }

    pub fn all_reviews(&self) -> Result<Vec<ReviewView>, DomainError> {
        self.repo.list_all()
    }
}
