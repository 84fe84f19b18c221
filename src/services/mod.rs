//! Domain services for the svg collection.
//!
//! ARCHITECTURE
//! ============
//! `store` owns persistence, `backup` owns the export document, and `library`
//! layers the acceptance rules a user-facing shell applies on top of both.

pub mod backup;
pub mod library;
pub mod store;
