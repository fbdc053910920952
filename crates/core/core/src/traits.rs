//! The storage contract the role engine consumes.
//!
//! Adapters implement this trait to provide persistence for roles and
//! role mappings. The engine issues every read and write through it and
//! never assumes transactions, retries, or locking beyond what the
//! adapter itself provides.

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::{Filter, Where};
use crate::types::{MappingData, Role, RoleData, RoleMapping};

/// Trait for storage backends holding roles and role mappings.
///
/// `find_or_create_role` and `create_mappings` are the only operations
/// expected to enforce uniqueness; everything else is plain CRUD. Storage
/// failures propagate unchanged to the engine's callers.
#[async_trait]
pub trait Storage: Send + Sync {
    // ==================== Role Operations ====================

    /// Finds roles matching a filter.
    async fn find_roles(&self, filter: &Filter) -> Result<Vec<Role>>;

    /// Finds a single role by id.
    async fn find_role_by_id(&self, id: &str) -> Result<Option<Role>>;

    /// Counts roles matching a where clause. `None` counts all roles.
    async fn count_roles(&self, where_: Option<&Where>) -> Result<usize>;

    /// Creates a new role from a payload, generating its id.
    async fn create_role(&self, data: RoleData) -> Result<Role>;

    /// Finds a role matching `where_`, creating one from `data` when
    /// nothing matches. The boolean is `true` when a role was created.
    async fn find_or_create_role(&self, where_: &Where, data: RoleData) -> Result<(Role, bool)>;

    /// Deletes all roles matching a where clause, returning the number
    /// removed. `None` deletes all roles.
    async fn destroy_roles(&self, where_: Option<&Where>) -> Result<usize>;

    /// Persists in-memory mutations of an existing role.
    async fn save_role(&self, role: &Role) -> Result<Role>;

    // ==================== Mapping Operations ====================

    /// Finds role mappings matching a filter.
    async fn find_mappings(&self, filter: &Filter) -> Result<Vec<RoleMapping>>;

    /// Counts role mappings matching a where clause.
    async fn count_mappings(&self, where_: Option<&Where>) -> Result<usize>;

    /// Bulk-creates role mappings, returning the created records.
    async fn create_mappings(&self, items: Vec<MappingData>) -> Result<Vec<RoleMapping>>;

    /// Deletes all role mappings matching a where clause, returning the
    /// number removed. `None` deletes all mappings.
    async fn destroy_mappings(&self, where_: Option<&Where>) -> Result<usize>;
}
