pub mod category;
pub mod expense;
pub mod postgres_repository;
pub mod subscription;
pub mod user;
