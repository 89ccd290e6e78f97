//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage-agnostic command repository contract.
//! - Provide the fixed-data mock, SQLite and in-memory backends.
//!
//! # Invariants
//! - Write paths validate required fields before staging.
//! - Repository APIs return semantic errors (`NotFound`, `Unsupported`) in
//!   addition to storage errors, and never swallow the latter.

pub mod command_repo;
pub mod memory_repo;
pub mod mock_repo;
pub mod sql_repo;
