//! Outbound persistence adapters implementing the store ports.

mod memory;

pub use memory::{InMemoryLeadStore, InMemoryUserStore};
