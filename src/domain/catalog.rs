use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;

use super::errors::DomainError;

/// Shown for products without an image of their own.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/200x200?text=No+Image";

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub rating_rate: f64,
    pub rating_count: i32,
}

impl Product {
    pub fn image_or_placeholder(&self) -> &str {
        self.image
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// Admin-editable product fields. Ratings are derived from reviews and are
/// never taken from input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
}

impl ProductInput {
    pub fn validate(self) -> Result<Self, DomainError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::InvalidInput("title is required".into()));
        }
        if self.price < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(
                "price must not be negative".into(),
            ));
        }
        if self.stock_quantity < 0 {
            return Err(DomainError::InvalidInput(
                "stock_quantity must not be negative".into(),
            ));
        }
        let image = self.image.filter(|url| !url.trim().is_empty());
        Ok(Self {
            title,
            image,
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInput {
    pub name: String,
    pub note: Option<String>,
}

impl CategoryInput {
    pub fn validate(self) -> Result<Self, DomainError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("category name is required".into()));
        }
        Ok(Self {
            name,
            note: self.note,
        })
    }
}
