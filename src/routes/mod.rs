pub mod category;
pub mod error;
pub mod expense;
pub mod health;
pub mod summary;
pub mod user;
