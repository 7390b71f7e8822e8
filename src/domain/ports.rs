use super::account::{Credentials, NewUser, ProfileUpdate, Role, User};
use super::cart::CartItem;
use super::catalog::{Category, CategoryInput, Product, ProductInput};
use super::errors::{DomainError, Outcome};
use super::order::{NewOrder, OrderStatus, OrderView, StatusChange, StockCheck, StockRequest};
use super::review::{DeletedReview, NewReview, ReviewView};
use super::stock::StockMovementView;

pub trait OrderRepository: Send + Sync + 'static {
    /// Advisory, read-only comparison of requested against available stock.
    fn check_stock(&self, items: &[StockRequest]) -> Result<StockCheck, DomainError>;
    /// Re-checks stock, inserts the order and its items and decrements stock,
    /// all or nothing.
    fn create(&self, order: NewOrder) -> Result<i32, DomainError>;
    fn update_status(
        &self,
        order_id: i32,
        status: OrderStatus,
    ) -> Result<Outcome<StatusChange>, DomainError>;
    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError>;
    fn list_for_user(&self, user_id: i32) -> Result<Vec<OrderView>, DomainError>;
    fn list_all(&self) -> Result<Vec<OrderView>, DomainError>;
    fn movements_for_product(
        &self,
        product_id: i32,
    ) -> Result<Vec<StockMovementView>, DomainError>;
}

pub trait ReviewRepository: Send + Sync + 'static {
    fn can_review(&self, order_id: i32, product_id: i32, user_id: i32)
        -> Result<bool, DomainError>;
    /// Inserts the review and refreshes the product rating. A failed refresh
    /// is reported as a warning, the review stays.
    fn add(&self, review: NewReview) -> Result<Outcome<i32>, DomainError>;
    fn delete(&self, review_id: i32) -> Result<DeletedReview, DomainError>;
    fn list_for_product(&self, product_id: i32) -> Result<Vec<ReviewView>, DomainError>;
    fn list_for_order(&self, order_id: i32, user_id: i32) -> Result<Vec<ReviewView>, DomainError>;
    fn list_all(&self) -> Result<Vec<ReviewView>, DomainError>;
}

pub trait CatalogRepository: Send + Sync + 'static {
    fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, DomainError>;
    fn find_product(&self, id: i32) -> Result<Option<Product>, DomainError>;
    fn create_product(&self, input: ProductInput) -> Result<Product, DomainError>;
    fn update_product(&self, id: i32, input: ProductInput) -> Result<Product, DomainError>;
    fn delete_product(&self, id: i32) -> Result<(), DomainError>;

    fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    fn find_category(&self, id: i32) -> Result<Option<Category>, DomainError>;
    fn create_category(&self, input: CategoryInput) -> Result<Category, DomainError>;
    fn update_category(&self, id: i32, input: CategoryInput) -> Result<Category, DomainError>;
    fn delete_category(&self, id: i32) -> Result<(), DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn create(&self, user: NewUser) -> Result<User, DomainError>;
    fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError>;
    fn credentials_by_email(&self, email: &str) -> Result<Option<Credentials>, DomainError>;
    fn credentials_by_id(&self, id: i32) -> Result<Option<Credentials>, DomainError>;
    fn update_profile(&self, id: i32, update: ProfileUpdate) -> Result<User, DomainError>;
    fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<(), DomainError>;
    fn update_role(&self, id: i32, role: Role) -> Result<User, DomainError>;
    fn list(&self) -> Result<Vec<User>, DomainError>;
    /// Deletes the user unless it is the last admin; orders, reviews and
    /// cart go with it.
    fn delete(&self, id: i32) -> Result<(), DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn items(&self, user_id: i32) -> Result<Vec<CartItem>, DomainError>;
    fn replace(&self, user_id: i32, items: Vec<CartItem>) -> Result<(), DomainError>;
    fn clear(&self, user_id: i32) -> Result<(), DomainError>;
}
