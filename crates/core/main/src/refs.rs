//! Reference types for roles and principals.
//!
//! Callers refer to roles by id, by name, or with an already-fetched
//! entity, and to principals by id or as an identifiable object. The
//! tagged unions here make resolution a match over the tag rather than
//! capability probing.

use rolegate_core::types::Role;
use serde_json::Value;
use tracing::warn;

/// A reference to a role: a key (id or name), a materialized entity, or
/// untyped boundary input.
#[derive(Debug, Clone)]
pub enum RoleRef {
    /// A role id or name; the resolver matches either.
    Key(String),
    /// An already-materialized role entity.
    Entity(Role),
    /// Untyped input: strings become keys, objects that deserialize as
    /// a role become entities, anything else is dropped with a warning.
    Value(Value),
}

impl From<&str> for RoleRef {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for RoleRef {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<&String> for RoleRef {
    fn from(s: &String) -> Self {
        Self::Key(s.clone())
    }
}

impl From<Role> for RoleRef {
    fn from(role: Role) -> Self {
        Self::Entity(role)
    }
}

impl From<&Role> for RoleRef {
    fn from(role: &Role) -> Self {
        Self::Entity(role.clone())
    }
}

impl From<Value> for RoleRef {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// A reference to a principal: an opaque id or an identifiable object.
#[derive(Debug, Clone)]
pub enum UserRef {
    /// The principal id itself.
    Id(String),
    /// Untyped input reduced to its `"id"` member.
    Value(Value),
}

impl UserRef {
    /// Normalizes this reference to a principal id. Empty and
    /// unidentifiable inputs compact away to `None`.
    pub fn normalize(&self) -> Option<String> {
        match self {
            Self::Id(id) if !id.is_empty() => Some(id.clone()),
            Self::Id(_) => None,
            Self::Value(value) => match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Object(map) => match map.get("id") {
                    Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
                    Some(Value::Number(id)) => Some(id.to_string()),
                    _ => None,
                },
                _ => None,
            },
        }
    }
}

impl From<&str> for UserRef {
    fn from(s: &str) -> Self {
        Self::Id(s.to_string())
    }
}

impl From<String> for UserRef {
    fn from(s: String) -> Self {
        Self::Id(s)
    }
}

impl From<&String> for UserRef {
    fn from(s: &String) -> Self {
        Self::Id(s.clone())
    }
}

impl From<Value> for UserRef {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Normalizes a list of principal references to a deduplicated,
/// compacted list of ids, preserving first-occurrence order.
pub fn normalize_users<I>(users: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<UserRef>,
{
    let mut ids: Vec<String> = Vec::new();
    for user in users {
        if let Some(id) = user.into().normalize() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Either every value on one side of a bulk operation, or a specific
/// list of references.
#[derive(Debug, Clone)]
pub enum Selector<T> {
    /// The wildcard: match all values on this side within scope.
    All,
    /// Specific references.
    Items(Vec<T>),
}

impl<T> Selector<T> {
    /// Creates a selector over specific references.
    pub fn items<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        Self::Items(items.into_iter().map(Into::into).collect())
    }
}

/// Splits role references into lookup keys and materialized entities,
/// dropping (with a warning) anything unusable.
pub(crate) fn partition_refs(refs: Vec<RoleRef>) -> (Vec<String>, Vec<Role>) {
    let mut keys = Vec::new();
    let mut entities = Vec::new();
    for r in refs {
        match r {
            RoleRef::Key(key) => {
                if !key.is_empty() {
                    keys.push(key);
                }
            }
            RoleRef::Entity(role) => entities.push(role),
            RoleRef::Value(Value::String(key)) => {
                if !key.is_empty() {
                    keys.push(key);
                }
            }
            RoleRef::Value(value) => match serde_json::from_value::<Role>(value.clone()) {
                Ok(role) => entities.push(role),
                Err(_) => warn!(%value, "dropping invalid role reference"),
            },
        }
    }
    (keys, entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::types::RoleData;
    use serde_json::json;

    #[test]
    fn test_normalize_user_refs() {
        assert_eq!(UserRef::from("tom").normalize(), Some("tom".into()));
        assert_eq!(UserRef::from("").normalize(), None);
        assert_eq!(
            UserRef::from(json!({"id": "tom"})).normalize(),
            Some("tom".into())
        );
        assert_eq!(UserRef::from(json!({"name": "tom"})).normalize(), None);
        assert_eq!(UserRef::from(json!(42)).normalize(), None);
    }

    #[test]
    fn test_normalize_users_compacts_and_dedupes() {
        let ids = normalize_users(["tom", "", "jerry", "tom"]);
        assert_eq!(ids, vec!["tom".to_string(), "jerry".to_string()]);
    }

    #[test]
    fn test_partition_keys_and_entities() {
        let role = Role::new(RoleData::new("admin"));
        let refs = vec![
            RoleRef::from("some-id"),
            RoleRef::from(&role),
            RoleRef::from(json!("by-name")),
            RoleRef::from(json!(42)),
            RoleRef::from(""),
        ];
        let (keys, entities) = partition_refs(refs);
        assert_eq!(keys, vec!["some-id".to_string(), "by-name".to_string()]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, role.id);
    }

    #[test]
    fn test_partition_accepts_serialized_roles() {
        let role = Role::new(RoleData::new("admin").scope("org:1"));
        let value = serde_json::to_value(&role).unwrap();
        let (keys, entities) = partition_refs(vec![RoleRef::from(value)]);
        assert!(keys.is_empty());
        assert_eq!(entities[0].id, role.id);
    }
}
