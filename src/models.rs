pub mod order;
pub mod theme;
