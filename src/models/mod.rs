pub mod category;
pub mod expense;
pub mod health;
pub mod pagination;
pub mod subscription;
pub mod summary;
pub mod user;
