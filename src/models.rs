pub mod auth;
pub mod dashboard;
pub mod expiry;
pub mod ledger;
pub mod medicine;
