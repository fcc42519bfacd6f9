pub mod user_repo;
pub use user_repo::UserRepository;
pub mod medicine_repo;
pub use medicine_repo::MedicineRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod expiry_repo;
pub use expiry_repo::ExpiryRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
