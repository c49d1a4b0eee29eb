//! Database implementations

pub mod activity_repository;
pub mod manager;
pub mod memory_repository;

pub use activity_repository::SqliteActivityRepository;
pub use manager::DbManager;
pub use memory_repository::InMemoryActivityRepository;
