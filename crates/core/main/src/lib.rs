//! # Rolegate
//!
//! A multi-tenant, hierarchy-aware role engine for Rust.
//!
//! Rolegate manages named roles partitioned by scope, resolves mixed
//! role references (ids, names, entities) into canonical role records,
//! computes transitive ancestor closures over a mutable inheritance
//! graph with cycle protection, and maintains role↔principal mappings —
//! all through a narrow async storage contract.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rolegate::prelude::*;
//! use rolegate_adapter_memory::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let rs = Roles::new(MemoryStore::new());
//!     let org = rs.scoped(["org:1"])?;
//!
//!     let member = org.add("member").await?;
//!     let admin = org.add("admin").await?;
//!     rs.inherit(&admin, [&member]).await?;
//!
//!     org.assign([&admin], ["tom"]).await?;
//!     let all = org.find_user_roles("tom", true).await?;
//!     assert_eq!(all, vec![admin.id.clone(), member.id.clone()]);
//!     Ok(())
//! }
//! ```

pub mod refs;
pub mod roles;
pub mod scope;

mod graph;
mod mapping;
mod resolver;

// Re-export core types
pub use rolegate_core::*;

pub use refs::{RoleRef, Selector, UserRef};
pub use roles::{RemoveTarget, RoleInput, Roles, RolesBuilder};
pub use scope::{Scope, ScopeRef, compose};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::refs::{RoleRef, Selector, UserRef};
    pub use crate::roles::{RemoveTarget, RoleInput, Roles, RolesBuilder};
    pub use crate::scope::{Scope, ScopeRef};
    pub use rolegate_core::error::{Error, Result};
    pub use rolegate_core::filter::{Filter, Order, Where};
    pub use rolegate_core::traits::Storage;
    pub use rolegate_core::types::{Role, RoleData, RoleMapping};
}
