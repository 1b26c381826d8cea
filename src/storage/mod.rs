//! Storage implementations for different backends

pub mod demo;
pub mod identity;
pub mod in_memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use identity::{StaticIdentityProvider, hash_password, verify_password};
pub use in_memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
