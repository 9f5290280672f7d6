pub mod config;
pub mod countdown;
pub mod models;
pub mod services;
pub mod storage;

pub use models::order::{Order, OrderStatus};
pub use services::orders::OrderStore;
pub use storage::Storage;
