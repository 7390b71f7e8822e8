//! Throw-away SQLite databases for repository tests.

use std::path::PathBuf;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use uuid::Uuid;

use crate::db::{create_pool, DbPool};
use crate::infrastructure::models::{NewUserRow, ProductChangeset};
use crate::schema::{orders, products, users};

/// A migrated database file that is removed again when dropped.
pub struct TestDb {
    pub pool: DbPool,
    path: PathBuf,
}

impl TestDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("storefront-test-{}.sqlite", Uuid::new_v4()));
        let pool = create_pool(path.to_str().expect("utf-8 temp path"))
            .expect("Failed to create pool");
        {
            let mut conn = pool.get().expect("Failed to get connection");
            conn.run_pending_migrations(crate::MIGRATIONS)
                .expect("Failed to run migrations");
        }
        Self { pool, path }
    }

    pub fn conn(&self) -> crate::db::DbConn {
        self.pool.get().expect("Failed to get connection")
    }

    pub fn insert_user(&self, email: &str, role: &str) -> i32 {
        diesel::insert_into(users::table)
            .values(&NewUserRow {
                email,
                password_hash: "not-a-real-hash",
                name: "Alice",
                address: None,
                role,
            })
            .returning(users::id)
            .get_result(&mut self.conn())
            .expect("insert user")
    }

    pub fn insert_product(&self, title: &str, price: &str, stock: i32) -> i32 {
        diesel::insert_into(products::table)
            .values(&ProductChangeset {
                title: title.to_string(),
                description: String::new(),
                category: "general".to_string(),
                image: None,
                price: price.to_string(),
                stock_quantity: stock,
            })
            .returning(products::id)
            .get_result(&mut self.conn())
            .expect("insert product")
    }

    pub fn stock_of(&self, product_id: i32) -> i32 {
        products::table
            .find(product_id)
            .select(products::stock_quantity)
            .first(&mut self.conn())
            .expect("product exists")
    }

    pub fn order_count(&self) -> i64 {
        orders::table
            .count()
            .get_result(&mut self.conn())
            .expect("count orders")
    }

    pub fn set_order_status(&self, order_id: i32, status: &str) {
        diesel::update(orders::table.find(order_id))
            .set(orders::status.eq(status))
            .execute(&mut self.conn())
            .expect("set status");
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub fn price(raw: &str) -> BigDecimal {
    BigDecimal::from_str(raw).expect("valid decimal")
}
