//! Core data types for Rolegate.
//!
//! This module defines the canonical `Role` and `RoleMapping` structs that
//! form the foundation of the role engine, plus the creation payloads the
//! storage contract accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Queryable;

/// Generates a new collision-resistant string identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A named, scoped permission grouping with zero or more parent roles.
///
/// Roles are partitioned by `scope`: `None` is the global partition, any
/// string is a tenant/context partition. Names are only unique within a
/// partition. Direct inheritance edges are stored on the child as
/// `parent_ids`; the stored graph is not guaranteed acyclic, so closure
/// computation must guard against cycles.
///
/// # Example
///
/// ```rust
/// use rolegate_core::types::{Role, RoleData};
///
/// let role = Role::new(RoleData::new("admin").scope("org:1"));
/// assert_eq!(role.name, "admin");
/// assert_eq!(role.scope.as_deref(), Some("org:1"));
/// assert!(role.parent_ids.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier, generated on creation.
    pub id: String,

    /// Human-readable label, unique only per scope.
    pub name: String,

    /// Partition key; `None` is the global partition.
    pub scope: Option<String>,

    /// Ids of direct parent roles within the same scope. Ordered,
    /// duplicates suppressed.
    #[serde(default)]
    pub parent_ids: Vec<String>,

    /// Timestamp when the role was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp when the role was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Creates a new role from a creation payload, generating its id and
    /// timestamps.
    pub fn new(data: RoleData) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: data.name,
            scope: data.scope,
            parent_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Creation payload for a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleData {
    /// Human-readable label.
    pub name: String,
    /// Partition key; `None` targets the global partition.
    pub scope: Option<String>,
}

impl RoleData {
    /// Creates a payload for the global partition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
        }
    }

    /// Sets the scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// A scoped association between a principal and a role.
///
/// `scope` always equals the scope of the referenced role; it is
/// denormalized onto the mapping for query efficiency. The pair
/// (`user_id`, `role_id`) is unique, enforced by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMapping {
    /// Unique identifier, generated on creation.
    pub id: String,

    /// Opaque principal identifier, caller-supplied.
    pub user_id: String,

    /// The referenced role id.
    pub role_id: String,

    /// Partition key, equal to the referenced role's scope.
    pub scope: Option<String>,

    /// Timestamp when the mapping was created.
    pub created_at: DateTime<Utc>,
}

impl RoleMapping {
    /// Creates a new mapping from a creation payload, generating its id
    /// and timestamp.
    pub fn new(data: MappingData) -> Self {
        Self {
            id: new_id(),
            user_id: data.user_id,
            role_id: data.role_id,
            scope: data.scope,
            created_at: Utc::now(),
        }
    }
}

/// Creation payload for a role mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingData {
    /// Opaque principal identifier.
    pub user_id: String,
    /// The referenced role id.
    pub role_id: String,
    /// Partition key, equal to the referenced role's scope.
    pub scope: Option<String>,
}

impl MappingData {
    /// Creates a new mapping payload.
    pub fn new(
        user_id: impl Into<String>,
        role_id: impl Into<String>,
        scope: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role_id: role_id.into(),
            scope,
        }
    }
}

impl Queryable for Role {
    fn field(&self, name: &str) -> Value {
        match name {
            "id" => Value::from(self.id.clone()),
            "name" => Value::from(self.name.clone()),
            "scope" => self.scope.clone().map(Value::from).unwrap_or(Value::Null),
            "parent_ids" => Value::from(self.parent_ids.clone()),
            _ => Value::Null,
        }
    }
}

impl Queryable for RoleMapping {
    fn field(&self, name: &str) -> Value {
        match name {
            "id" => Value::from(self.id.clone()),
            "user_id" => Value::from(self.user_id.clone()),
            "role_id" => Value::from(self.role_id.clone()),
            "scope" => self.scope.clone().map(Value::from).unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_role_has_generated_id() {
        let a = Role::new(RoleData::new("member"));
        let b = Role::new(RoleData::new("member"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.scope, None);
    }

    #[test]
    fn test_role_field_access() {
        let role = Role::new(RoleData::new("admin").scope("team:9"));
        assert_eq!(role.field("name"), Value::from("admin"));
        assert_eq!(role.field("scope"), Value::from("team:9"));
        assert_eq!(role.field("unknown"), Value::Null);
    }

    #[test]
    fn test_global_scope_is_null_field() {
        let role = Role::new(RoleData::new("admin"));
        assert_eq!(role.field("scope"), Value::Null);
    }

    #[test]
    fn test_mapping_field_access() {
        let mapping = RoleMapping::new(MappingData::new("tom", "r1", Some("x".into())));
        assert_eq!(mapping.field("user_id"), Value::from("tom"));
        assert_eq!(mapping.field("role_id"), Value::from("r1"));
        assert_eq!(mapping.field("scope"), Value::from("x"));
    }
}
