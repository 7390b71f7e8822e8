use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::catalog::{Category, CategoryInput, Product, ProductInput};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{categories, order_items, products, stock_movements};

use super::models::{CategoryRow, NewCategoryRow, ProductChangeset, ProductRow};

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<ProductInput> for ProductChangeset {
    fn from(input: ProductInput) -> Self {
        ProductChangeset {
            title: input.title,
            description: input.description,
            category: input.category,
            image: input.image,
            price: input.price.to_string(),
            stock_quantity: input.stock_quantity,
        }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = products::table
            .select(ProductRow::as_select())
            .order(products::id.asc())
            .into_boxed();
        if let Some(category) = category {
            query = query.filter(products::category.eq(category.to_string()));
        }

        query
            .load(&mut conn)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    fn find_product(&self, id: i32) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn create_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(products::table)
            .values(&ProductChangeset::from(input))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)?
            .try_into()
    }

    fn update_product(&self, id: i32, input: ProductInput) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(products::table.find(id))
            .set(&ProductChangeset::from(input))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .optional()?
            .ok_or_else(|| DomainError::not_found("Product", id))?
            .try_into()
    }

    fn delete_product(&self, id: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let ordered: bool = diesel::select(exists(
            order_items::table.filter(order_items::product_id.eq(id)),
        ))
        .get_result(&mut conn)?;
        let audited: bool = diesel::select(exists(
            stock_movements::table.filter(stock_movements::product_id.eq(id)),
        ))
        .get_result(&mut conn)?;
        if ordered || audited {
            return Err(DomainError::Conflict(format!(
                "product {id} is referenced by orders or stock movements"
            )));
        }

        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::not_found("Product", id));
        }
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(categories::table
            .select(CategoryRow::as_select())
            .order(categories::name.asc())
            .load(&mut conn)?
            .into_iter()
            .map(Category::from)
            .collect())
    }

    fn find_category(&self, id: i32) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(categories::table
            .find(id)
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Category::from))
    }

    fn create_category(&self, input: CategoryInput) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(diesel::insert_into(categories::table)
            .values(&NewCategoryRow {
                name: input.name,
                note: input.note,
            })
            .returning(CategoryRow::as_returning())
            .get_result::<CategoryRow>(&mut conn)?
            .into())
    }

    fn update_category(&self, id: i32, input: CategoryInput) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(diesel::update(categories::table.find(id))
            .set((
                categories::name.eq(input.name),
                categories::note.eq(input.note),
                categories::updated_at.eq(Utc::now().naive_utc()),
            ))
            .returning(CategoryRow::as_returning())
            .get_result::<CategoryRow>(&mut conn)
            .optional()?
            .ok_or_else(|| DomainError::not_found("Category", id))?
            .into())
    }

    fn delete_category(&self, id: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(categories::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::not_found("Category", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DieselCatalogRepository;
    use crate::domain::catalog::{CategoryInput, ProductInput};
    use crate::domain::errors::DomainError;
    use crate::domain::order::{NewOrder, OrderItemInput};
    use crate::domain::ports::{CatalogRepository, OrderRepository};
    use crate::infrastructure::order_repo::DieselOrderRepository;
    use crate::infrastructure::test_support::{price, TestDb};

    fn input(title: &str, category: &str, stock: i32) -> ProductInput {
        ProductInput {
            title: title.into(),
            description: "hand made".into(),
            category: category.into(),
            image: None,
            price: price("19.90"),
            stock_quantity: stock,
        }
    }

    #[test]
    fn product_crud_keeps_decimal_price() {
        let db = TestDb::new();
        let repo = DieselCatalogRepository::new(db.pool.clone());

        let created = repo.create_product(input("Mug", "kitchen", 3)).unwrap();
        assert_eq!(created.price, price("19.90"));
        assert_eq!(created.rating_count, 0);

        let mut change = input("Big Mug", "kitchen", 9);
        change.image = Some("https://img.example/mug.png".into());
        let updated = repo.update_product(created.id, change).unwrap();
        assert_eq!(updated.title, "Big Mug");
        assert_eq!(updated.stock_quantity, 9);

        let found = repo.find_product(created.id).unwrap().unwrap();
        assert_eq!(found, updated);

        repo.delete_product(created.id).unwrap();
        assert!(repo.find_product(created.id).unwrap().is_none());
        assert!(matches!(
            repo.delete_product(created.id),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn list_filters_by_category() {
        let db = TestDb::new();
        let repo = DieselCatalogRepository::new(db.pool.clone());
        repo.create_product(input("Mug", "kitchen", 1)).unwrap();
        repo.create_product(input("Lamp", "living", 1)).unwrap();

        assert_eq!(repo.list_products(None).unwrap().len(), 2);
        let kitchen = repo.list_products(Some("kitchen")).unwrap();
        assert_eq!(kitchen.len(), 1);
        assert_eq!(kitchen[0].title, "Mug");
    }

    #[test]
    fn ordered_product_cannot_be_deleted() {
        let db = TestDb::new();
        let repo = DieselCatalogRepository::new(db.pool.clone());
        let orders = DieselOrderRepository::new(db.pool.clone());
        let user = db.insert_user("alice@example.com", "customer");
        let mug = repo.create_product(input("Mug", "kitchen", 5)).unwrap();
        orders
            .create(
                NewOrder::validate(
                    user,
                    "Alice",
                    "123 St",
                    vec![OrderItemInput {
                        product_id: mug.id,
                        quantity: 1,
                        price: price("19.90"),
                    }],
                )
                .unwrap(),
            )
            .unwrap();

        assert!(matches!(
            repo.delete_product(mug.id),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn update_missing_product_is_not_found() {
        let db = TestDb::new();
        let repo = DieselCatalogRepository::new(db.pool.clone());
        assert!(matches!(
            repo.update_product(12, input("Mug", "kitchen", 1)),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn category_crud() {
        let db = TestDb::new();
        let repo = DieselCatalogRepository::new(db.pool.clone());

        let created = repo
            .create_category(CategoryInput {
                name: "Kitchen".into(),
                note: None,
            })
            .unwrap();
        let updated = repo
            .update_category(
                created.id,
                CategoryInput {
                    name: "Kitchenware".into(),
                    note: Some("pots and pans".into()),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Kitchenware");
        assert_eq!(updated.note.as_deref(), Some("pots and pans"));
        assert_eq!(repo.list_categories().unwrap().len(), 1);

        repo.delete_category(created.id).unwrap();
        assert!(repo.find_category(created.id).unwrap().is_none());
    }
}
