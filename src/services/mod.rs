// Service exports
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::{MemoryStore, MemoryTx};
pub use postgres::{PgLedgerTx, PostgresStore};
pub use store::{LedgerTx, MatchStore, StoreError};
