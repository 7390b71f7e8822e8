use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(
        "Insufficient stock for product {product_id} (have {available}, need {requested})"
    )]
    InsufficientStock {
        product_id: i32,
        available: i32,
        requested: i32,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: i32) -> Self {
        DomainError::NotFound(format!("{entity} {id}"))
    }
}

/// Successful result that may carry a warning about a secondary step that
/// failed without undoing the primary one.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub warning: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn with_warning(value: T, warning: impl Into<String>) -> Self {
        Self {
            value,
            warning: Some(warning.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_shortfall() {
        let err = DomainError::InsufficientStock {
            product_id: 7,
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7 (have 2, need 5)"
        );
    }

    #[test]
    fn not_found_names_entity() {
        assert_eq!(
            DomainError::not_found("Order", 3).to_string(),
            "Order 3 not found"
        );
    }
}
