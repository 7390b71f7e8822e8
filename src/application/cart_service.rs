use crate::domain::cart::{normalize_cart, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

pub struct CartService<R> {
    repo: R,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get_cart(&self, user_id: i32) -> Result<Vec<CartItem>, DomainError> {
        self.repo.items(user_id)
    }

    pub fn save_cart(&self, user_id: i32, items: Vec<CartItem>) -> Result<Vec<CartItem>, DomainError> {
        let items = normalize_cart(items)?;
        self.repo.replace(user_id, items)?;
        self.repo.items(user_id)
    }

    pub fn clear_cart(&self, user_id: i32) -> Result<(), DomainError> {
        self.repo.clear(user_id)
    }
}
