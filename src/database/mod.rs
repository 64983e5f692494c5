pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryTenantStore;
pub use postgres::PgTenantStore;
pub use store::TenantStore;
