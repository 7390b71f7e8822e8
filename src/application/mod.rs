pub mod account_service;
pub mod cart_service;
pub mod catalog_service;
pub mod order_service;
pub mod review_service;

pub use account_service::{AccountService, Session};
pub use cart_service::CartService;
pub use catalog_service::CatalogService;
pub use order_service::{OrderService, StockLedger};
pub use review_service::ReviewService;
