use crate::domain::errors::{DomainError, Outcome};
use crate::domain::order::{
    NewOrder, OrderItemInput, OrderStatus, OrderView, StatusChange, StockCheck, StockRequest,
};
use crate::domain::ports::OrderRepository;
use crate::domain::stock::{LedgerSummary, StockMovementView};

/// Movement log of one product with its running balance.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLedger {
    pub product_id: i32,
    pub movements: Vec<StockMovementView>,
    pub summary: LedgerSummary,
}

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn check_stock(&self, items: Vec<StockRequest>) -> Result<StockCheck, DomainError> {
        if items.is_empty() {
            return Err(DomainError::InvalidInput(
                "at least one item is required".into(),
            ));
        }
        if let Some(bad) = items.iter().find(|i| i.quantity <= 0) {
            return Err(DomainError::InvalidInput(format!(
                "quantity for product {} must be positive",
                bad.product_id
            )));
        }
        self.repo.check_stock(&items)
    }

    pub fn create_order(
        &self,
        user_id: i32,
        shipping_name: &str,
        shipping_address: &str,
        items: Vec<OrderItemInput>,
    ) -> Result<i32, DomainError> {
        let order = NewOrder::validate(user_id, shipping_name, shipping_address, items)?;
        let lines = order.items.len();

        match self.repo.create(order) {
            Ok(order_id) => {
                log::info!(
                    "Order {} created for user {} with {} item(s)",
                    order_id,
                    user_id,
                    lines
                );
                Ok(order_id)
            }
            Err(e @ DomainError::InsufficientStock { .. }) => {
                log::warn!("Order for user {} rejected: {}", user_id, e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub fn update_order_status(
        &self,
        order_id: i32,
        status: OrderStatus,
    ) -> Result<Outcome<StatusChange>, DomainError> {
        let outcome = self.repo.update_status(order_id, status)?;
        let change = &outcome.value;
        log::info!(
            "Order {} moved {} -> {} ({} stock movement(s))",
            change.order_id,
            change.previous,
            change.status,
            change.movements.len()
        );
        Ok(outcome)
    }

    pub fn get_order(&self, id: i32) -> Result<OrderView, DomainError> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    pub fn list_user_orders(&self, user_id: i32) -> Result<Vec<OrderView>, DomainError> {
        self.repo.list_for_user(user_id)
    }

    pub fn list_all_orders(&self) -> Result<Vec<OrderView>, DomainError> {
        self.repo.list_all()
    }

    pub fn stock_ledger(&self, product_id: i32) -> Result<StockLedger, DomainError> {
        let movements = self.repo.movements_for_product(product_id)?;
        let summary = LedgerSummary::from_movements(&movements);
        Ok(StockLedger {
            product_id,
            movements,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::infrastructure::test_support::{price, TestDb};
    use crate::infrastructure::DieselOrderRepository;

    /// Counts store calls so validation can be shown to happen first.
    #[derive(Default)]
    struct CountingRepo {
        calls: AtomicUsize,
    }

    impl CountingRepo {
        fn touched<T>(&self) -> Result<T, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::Internal("store must not be reached".into()))
        }
    }

    impl OrderRepository for CountingRepo {
        fn check_stock(&self, _: &[StockRequest]) -> Result<StockCheck, DomainError> {
            self.touched()
        }
        fn create(&self, _: NewOrder) -> Result<i32, DomainError> {
            self.touched()
        }
        fn update_status(
            &self,
            _: i32,
            _: OrderStatus,
        ) -> Result<Outcome<StatusChange>, DomainError> {
            self.touched()
        }
        fn find_by_id(&self, _: i32) -> Result<Option<OrderView>, DomainError> {
            self.touched()
        }
        fn list_for_user(&self, _: i32) -> Result<Vec<OrderView>, DomainError> {
            self.touched()
        }
        fn list_all(&self) -> Result<Vec<OrderView>, DomainError> {
            self.touched()
        }
        fn movements_for_product(&self, _: i32) -> Result<Vec<StockMovementView>, DomainError> {
            self.touched()
        }
    }

    fn item(product_id: i32, quantity: i32) -> OrderItemInput {
        OrderItemInput {
            product_id,
            quantity,
            price: price("100"),
        }
    }

    #[test]
    fn invalid_orders_never_reach_the_store() {
        let service = OrderService::new(CountingRepo::default());

        let cases = [
            service.create_order(1, "", "123 St", vec![item(1, 1)]),
            service.create_order(1, "Alice", "   ", vec![item(1, 1)]),
            service.create_order(1, "Alice", "123 St", vec![]),
            service.create_order(1, "Alice", "123 St", vec![item(1, 0)]),
        ];
        for result in cases {
            assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        }
        assert!(matches!(
            service.check_stock(vec![]),
            Err(DomainError::InvalidInput(_))
        ));
        assert_eq!(service.repo.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ledger_balances_with_stock_after_round_trip() {
        let db = TestDb::new();
        let service = OrderService::new(DieselOrderRepository::new(db.pool.clone()));
        let user = db.insert_user("alice@example.com", "customer");
        let product = db.insert_product("Lamp", "100", 10);

        let order = service
            .create_order(user, "Alice", "123 St", vec![item(product, 3)])
            .unwrap();
        let after_create = db.stock_of(product);
        service
            .update_order_status(order, OrderStatus::Paid)
            .unwrap();
        service
            .update_order_status(order, OrderStatus::Cancelled)
            .unwrap();

        let ledger = service.stock_ledger(product).unwrap();
        assert_eq!(ledger.movements.len(), 2);
        assert_eq!(ledger.summary.total_out, 3);
        assert_eq!(ledger.summary.total_in, 3);
        assert_eq!(
            after_create as i64 + ledger.summary.net(),
            db.stock_of(product) as i64
        );
    }

    #[test]
    fn missing_order_is_not_found() {
        let db = TestDb::new();
        let service = OrderService::new(DieselOrderRepository::new(db.pool.clone()));
        assert!(matches!(
            service.get_order(77),
            Err(DomainError::NotFound(_))
        ));
    }
}
