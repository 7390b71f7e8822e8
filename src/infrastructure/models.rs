use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::account::{Role, User};
use crate::domain::catalog::{Category, Product};
use crate::domain::errors::DomainError;
use crate::domain::stock::{MovementType, StockMovementView};
use crate::schema::{
    cart_items, categories, order_items, orders, products, reviews, stock_movements, users,
};

pub(crate) fn parse_price(raw: &str) -> Result<BigDecimal, DomainError> {
    BigDecimal::from_str(raw)
        .map_err(|e| DomainError::Internal(format!("stored price '{raw}' is not a decimal: {e}")))
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub price: String,
    pub stock_quantity: i32,
    pub rating_rate: f64,
    pub rating_count: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            price: parse_price(&row.price)?,
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            image: row.image,
            stock_quantity: row.stock_quantity,
            rating_rate: row.rating_rate,
            rating_count: row.rating_count,
        })
    }
}

/// Insert and full-update changeset; `treat_none_as_null` so clearing the
/// image really clears it.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangeset {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub price: String,
    pub stock_quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategoryRow {
    pub name: String,
    pub note: Option<String>,
}

// ── Orders & stock ledger ────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub id: i32,
    pub user_id: i32,
    pub shipping_name: String,
    pub shipping_address: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub user_id: i32,
    pub shipping_name: &'a str,
    pub shipping_address: &'a str,
    pub status: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderItemRow {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = stock_movements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockMovementRow {
    pub id: i32,
    pub product_id: i32,
    pub order_id: Option<i32>,
    pub quantity: i32,
    pub movement_type: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<StockMovementRow> for StockMovementView {
    type Error = DomainError;

    fn try_from(row: StockMovementRow) -> Result<Self, Self::Error> {
        Ok(StockMovementView {
            movement_type: MovementType::from_str(&row.movement_type)?,
            id: row.id,
            product_id: row.product_id,
            order_id: row.order_id,
            quantity: row.quantity,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stock_movements)]
pub struct NewStockMovementRow<'a> {
    pub product_id: i32,
    pub order_id: i32,
    pub quantity: i32,
    pub movement_type: &'a str,
}

// ── Reviews ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReviewRow {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_anonymous: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow<'a> {
    pub order_id: i32,
    pub product_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<&'a str>,
    pub is_anonymous: bool,
}

// ── Users & carts ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub address: Option<String>,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl UserRow {
    pub fn into_user(self) -> Result<(User, String), DomainError> {
        let role = Role::from_str(&self.role)
            .map_err(|_| DomainError::Internal(format!("stored role '{}' is unknown", self.role)))?;
        Ok((
            User {
                id: self.id,
                email: self.email,
                name: self.name,
                address: self.address,
                role,
                created_at: self.created_at,
            },
            self.password_hash,
        ))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub address: Option<&'a str>,
    pub role: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CartItemRow {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}
