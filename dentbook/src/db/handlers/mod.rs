//! Store implementations.
//!
//! Handlers talk to persistence through the [`Store`] trait. Two backends exist:
//!
//! - [`InMemoryStore`]: concurrent maps, lost on restart. Used in tests and by default.
//! - [`PostgresStore`]: SQLx over PostgreSQL, with migrations from `migrations/`.

pub mod in_memory;
pub mod postgres;
pub mod store;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::Store;
