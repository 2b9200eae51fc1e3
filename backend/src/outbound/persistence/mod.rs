//! Persistence adapters.
//!
//! The relational schema of the original system is out of scope; the ports in
//! [`crate::domain::ports`] are the persistence contract, and this in-memory
//! adapter is the reference implementation behind them.

mod memory;

pub use memory::InMemoryStore;
