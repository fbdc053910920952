//! # Rolegate Core
//!
//! This crate provides the foundational types and traits for the Rolegate
//! role engine. It defines the core data structures (`Role`,
//! `RoleMapping`), the query filter model, the error types, and the
//! `Storage` trait that adapters implement.

pub mod error;
pub mod filter;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{Error, Result};
pub use filter::{Filter, Order, Queryable, Where};
pub use traits::Storage;
pub use types::{MappingData, Role, RoleData, RoleMapping, new_id};
