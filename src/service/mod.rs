pub mod access;
pub mod aggregation;
pub mod category;
pub mod expense;
pub mod summary;
