//! Domain model for the command catalogue.
//!
//! # Responsibility
//! - Define the record shape shared by every repository backend.
//!
//! # Invariants
//! - Identity is storage-assigned and immutable.
//! - There are no relationships; commands form one flat collection.

pub mod command;
