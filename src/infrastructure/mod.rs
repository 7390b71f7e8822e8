pub mod cart_repo;
pub mod catalog_repo;
pub mod models;
pub mod order_repo;
pub mod review_repo;
pub mod user_repo;

#[cfg(test)]
pub(crate) mod test_support;

pub use cart_repo::DieselCartRepository;
pub use catalog_repo::DieselCatalogRepository;
pub use order_repo::DieselOrderRepository;
pub use review_repo::DieselReviewRepository;
pub use user_repo::DieselUserRepository;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::NotFound => DomainError::NotFound("Record".to_string()),
            DieselError::DatabaseError(
                kind @ (DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation),
                info,
            ) => DomainError::Conflict(format!("{kind:?}: {}", info.message())),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}
