pub mod auth;
pub mod medicines;
pub mod reports;
pub mod stock;
