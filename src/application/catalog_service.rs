use crate::domain::catalog::{Category, CategoryInput, Product, ProductInput};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;

pub struct CatalogService<R> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, DomainError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        self.repo.list_products(category)
    }

    pub fn get_product(&self, id: i32) -> Result<Product, DomainError> {
        self.repo
            .find_product(id)?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    pub fn create_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        let product = self.repo.create_product(input.validate()?)?;
        log::info!("Product {} '{}' created", product.id, product.title);
        Ok(product)
    }

    pub fn update_product(&self, id: i32, input: ProductInput) -> Result<Product, DomainError> {
        let product = self.repo.update_product(id, input.validate()?)?;
        log::info!("Product {} updated", id);
        Ok(product)
    }

    pub fn delete_product(&self, id: i32) -> Result<(), DomainError> {
        self.repo.delete_product(id)?;
        log::info!("Product {} deleted", id);
        Ok(())
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories()
    }

    pub fn get_category(&self, id: i32) -> Result<Category, DomainError> {
        self.repo
            .find_category(id)?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    pub fn create_category(&self, input: CategoryInput) -> Result<Category, DomainError> {
        self.repo.create_category(input.validate()?)
    }

    pub fn update_category(&self, id: i32, input: CategoryInput) -> Result<Category, DomainError> {
        self.repo.update_category(id, input.validate()?)
    }

    pub fn delete_category(&self, id: i32) -> Result<(), DomainError> {
        self.repo.delete_category(id)
    }
}
