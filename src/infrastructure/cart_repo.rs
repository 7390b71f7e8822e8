use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::cart::CartItem;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, products};

use super::models::CartItemRow;

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn items(&self, user_id: i32) -> Result<Vec<CartItem>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .order(cart_items::product_id.asc())
            .select(CartItemRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(|row| CartItem {
                product_id: row.product_id,
                quantity: row.quantity,
            })
            .collect())
    }

    fn replace(&self, user_id: i32, items: Vec<CartItem>) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<CartItemRow> = items
            .into_iter()
            .map(|item| CartItemRow {
                user_id,
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect();

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut ids: Vec<i32> = rows.iter().map(|r| r.product_id).collect();
            ids.sort_unstable();
            ids.dedup();
            let expected = ids.len();
            let known: i64 = products::table
                .filter(products::id.eq_any(ids))
                .count()
                .get_result(conn)?;
            if known as usize != expected {
                return Err(DomainError::NotFound("Product in cart".to_string()));
            }

            diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
                .execute(conn)?;
            if !rows.is_empty() {
                diesel::insert_into(cart_items::table)
                    .values(&rows)
                    .execute(conn)?;
            }
            Ok(())
        })
    }

    fn clear(&self, user_id: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
            .execute(&mut conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DieselCartRepository;
    use crate::domain::cart::CartItem;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::CartRepository;
    use crate::infrastructure::test_support::TestDb;

    #[test]
    fn replace_overwrites_and_clear_empties() {
        let db = TestDb::new();
        let repo = DieselCartRepository::new(db.pool.clone());
        let user = db.insert_user("alice@example.com", "customer");
        let mug = db.insert_product("Mug", "5", 5);
        let lamp = db.insert_product("Lamp", "50", 5);

        repo.replace(
            user,
            vec![
                CartItem { product_id: mug, quantity: 2 },
                CartItem { product_id: lamp, quantity: 1 },
            ],
        )
        .unwrap();
        repo.replace(user, vec![CartItem { product_id: lamp, quantity: 3 }])
            .unwrap();
        assert_eq!(
            repo.items(user).unwrap(),
            vec![CartItem { product_id: lamp, quantity: 3 }]
        );

        repo.clear(user).unwrap();
        assert!(repo.items(user).unwrap().is_empty());
    }

    #[test]
    fn unknown_product_is_rejected() {
        let db = TestDb::new();
        let repo = DieselCartRepository::new(db.pool.clone());
        let user = db.insert_user("alice@example.com", "customer");

        let err = repo
            .replace(user, vec![CartItem { product_id: 404, quantity: 1 }])
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
