use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            other => Err(DomainError::Internal(format!(
                "unknown movement type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockMovementView {
    pub id: i32,
    pub product_id: i32,
    /// `None` once the order has been deleted along with its user.
    pub order_id: Option<i32>,
    pub quantity: i32,
    pub movement_type: MovementType,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub total_in: i64,
    pub total_out: i64,
}

impl LedgerSummary {
    pub fn from_movements<'a>(movements: impl IntoIterator<Item = &'a StockMovementView>) -> Self {
        movements
            .into_iter()
            .fold(LedgerSummary::default(), |mut acc, m| {
                match m.movement_type {
                    MovementType::In => acc.total_in += i64::from(m.quantity),
                    MovementType::Out => acc.total_out += i64::from(m.quantity),
                }
                acc
            })
    }

    /// Net change the ledger accounts for; `initial + net == current` when
    /// every stock change went through a status transition.
    pub fn net(&self) -> i64 {
        self.total_in - self.total_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(movement_type: MovementType, quantity: i32) -> StockMovementView {
        StockMovementView {
            id: 0,
            product_id: 1,
            order_id: Some(1),
            quantity,
            movement_type,
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn ledger_nets_in_against_out() {
        let log = [
            movement(MovementType::Out, 3),
            movement(MovementType::In, 3),
            movement(MovementType::Out, 2),
        ];
        let summary = LedgerSummary::from_movements(&log);
        assert_eq!(summary.total_in, 3);
        assert_eq!(summary.total_out, 5);
        assert_eq!(summary.net(), -2);
    }

    #[test]
    fn empty_ledger_is_zero() {
        assert_eq!(LedgerSummary::from_movements(&[]).net(), 0);
    }
}
