pub mod access;
pub mod alert_service;
pub mod auth;
pub mod expiry_service;
pub mod ledger_service;
pub mod medicine_service;

#[cfg(test)]
pub(crate) mod test_support;
