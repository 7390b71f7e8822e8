use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::stock::MovementType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Stock side effect of moving an order from `self` to `next`.
    ///
    /// Only transitions across the paid boundary touch stock: entering `paid`
    /// from any other status takes stock out, and `paid -> cancelled` puts it
    /// back. Every other transition only rewrites the status.
    pub fn stock_effect(self, next: OrderStatus) -> Option<MovementType> {
        match (self, next) {
            (OrderStatus::Paid, OrderStatus::Paid) => None,
            (_, OrderStatus::Paid) => Some(MovementType::Out),
            (OrderStatus::Paid, OrderStatus::Cancelled) => Some(MovementType::In),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown order status '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemInput {
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
}

/// A checkout that passed input validation and is ready for the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i32,
    pub shipping_name: String,
    pub shipping_address: String,
    pub items: Vec<OrderItemInput>,
}

impl NewOrder {
    pub fn validate(
        user_id: i32,
        shipping_name: &str,
        shipping_address: &str,
        items: Vec<OrderItemInput>,
    ) -> Result<Self, DomainError> {
        let shipping_name = shipping_name.trim();
        let shipping_address = shipping_address.trim();
        if shipping_name.is_empty() {
            return Err(DomainError::InvalidInput(
                "shipping_name must not be empty".into(),
            ));
        }
        if shipping_address.is_empty() {
            return Err(DomainError::InvalidInput(
                "shipping_address must not be empty".into(),
            ));
        }
        if items.is_empty() {
            return Err(DomainError::InvalidInput(
                "an order needs at least one item".into(),
            ));
        }
        for item in &items {
            if item.quantity <= 0 {
                return Err(DomainError::InvalidInput(format!(
                    "quantity for product {} must be positive",
                    item.product_id
                )));
            }
            if item.price <= BigDecimal::zero() {
                return Err(DomainError::InvalidInput(format!(
                    "price for product {} must be positive",
                    item.product_id
                )));
            }
        }
        Ok(Self {
            user_id,
            shipping_name: shipping_name.to_string(),
            shipping_address: shipping_address.to_string(),
            items,
        })
    }

    /// Requested quantity per product, summed over duplicate lines.
    pub fn requested_by_product(&self) -> Result<Vec<StockRequest>, DomainError> {
        let mut totals: Vec<StockRequest> = Vec::new();
        for item in &self.items {
            match totals.iter_mut().find(|r| r.product_id == item.product_id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(item.quantity)
                        .ok_or_else(|| {
                            DomainError::InvalidInput(format!(
                                "quantity for product {} is too large",
                                item.product_id
                            ))
                        })?;
                }
                None => totals.push(StockRequest {
                    product_id: item.product_id,
                    quantity: item.quantity,
                }),
            }
        }
        Ok(totals)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemView {
    pub id: i32,
    pub product_id: i32,
    pub product_title: Option<String>,
    pub product_image: Option<String>,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub id: i32,
    pub user_id: i32,
    pub user_email: Option<String>,
    pub shipping_name: String,
    pub shipping_address: String,
    pub status: OrderStatus,
    pub created_at: NaiveDateTime,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub order_id: i32,
    pub previous: OrderStatus,
    pub status: OrderStatus,
    /// Movements appended to the ledger by this transition.
    pub movements: Vec<super::stock::StockMovementView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockCheckLine {
    pub product_id: i32,
    pub title: Option<String>,
    pub requested: i32,
    pub available: Option<i32>,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockCheck {
    pub is_valid: bool,
    pub results: Vec<StockCheckLine>,
}

impl StockCheck {
    pub fn from_lines(results: Vec<StockCheckLine>) -> Self {
        Self {
            is_valid: results.iter().all(|line| line.valid),
            results,
        }
    }

    pub fn out_of_stock(&self) -> impl Iterator<Item = &StockCheckLine> {
        self.results.iter().filter(|line| !line.valid)
    }
}
