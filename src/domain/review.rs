use chrono::NaiveDateTime;

use super::errors::DomainError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub order_id: i32,
    pub product_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_anonymous: bool,
}

impl NewReview {
    pub fn validate(self) -> Result<Self, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(DomainError::InvalidInput(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(Self { comment, ..self })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewView {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub product_title: Option<String>,
    pub user_id: i32,
    pub user_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_anonymous: bool,
    pub created_at: NaiveDateTime,
}

/// Displayed rating of a product, derived from its review set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    pub rate: f64,
    pub count: i32,
}

impl RatingSummary {
    /// Average rounded to two decimals; `0/0` when there are no ratings.
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return RatingSummary::default();
        }
        let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
        let avg = sum as f64 / ratings.len() as f64;
        RatingSummary {
            rate: (avg * 100.0).round() / 100.0,
            count: ratings.len() as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeletedReview {
    pub review_id: i32,
    pub product_id: i32,
    pub rating: RatingSummary,
}

/// Name shown for an anonymous reviewer: first two characters, the rest
/// replaced by `*`. Names of two characters or fewer get a fixed `***`.
pub fn mask_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= 2 {
        return format!("{name}***");
    }
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| if i < 2 { c } else { '*' })
        .collect()
}
