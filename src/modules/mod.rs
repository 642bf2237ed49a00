pub mod ingredient;
pub mod metrics;
pub mod recipe;
pub mod schedule;
pub mod user;
