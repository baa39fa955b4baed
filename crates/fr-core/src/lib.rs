//! fritter/crates/fr-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Fritter.

pub mod access;
pub mod aggregator;
pub mod error;
pub mod lookup;
pub mod models;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use access::*;
pub use aggregator::*;
pub use error::*;
pub use lookup::*;
pub use models::*;
pub use traits::*;
