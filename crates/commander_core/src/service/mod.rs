//! Service wiring around the repository layer.
//!
//! # Responsibility
//! - Hold the startup-selected backend and hand out per-unit-of-work
//!   repositories, keeping callers storage-agnostic.

pub mod backend;
