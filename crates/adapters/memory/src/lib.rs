//! # Rolegate Memory Adapter
//!
//! An in-memory storage adapter for Rolegate, primarily intended for
//! testing and development purposes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rolegate_adapter_memory::MemoryStore;
//! use rolegate::Roles;
//!
//! let roles = Roles::new(MemoryStore::new());
//! ```

use async_trait::async_trait;
use rolegate_core::error::{Error, Result};
use rolegate_core::filter::{Filter, Queryable, Where};
use rolegate_core::traits::Storage;
use rolegate_core::types::{MappingData, Role, RoleData, RoleMapping};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage for a single entity type.
type Store<T> = Arc<RwLock<HashMap<String, T>>>;

/// In-memory storage adapter for Rolegate.
///
/// This adapter stores all data in memory and is suitable for testing
/// and development. Data is lost when the process exits. The
/// (`user_id`, `role_id`) uniqueness constraint on mappings is enforced
/// here, mirroring what a database uniqueness index would do.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    roles: Store<Role>,
    mappings: Store<RoleMapping>,
}

impl MemoryStore {
    /// Creates a new in-memory adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all stored data.
    pub async fn clear(&self) {
        self.roles.write().await.clear();
        self.mappings.write().await.clear();
    }

    /// Returns the number of roles stored.
    pub async fn role_count(&self) -> usize {
        self.roles.read().await.len()
    }

    /// Returns the number of mappings stored.
    pub async fn mapping_count(&self) -> usize {
        self.mappings.read().await.len()
    }
}

/// Applies a filter's where clause, ordering and pagination to records.
fn apply_filter<T: Queryable + Clone>(records: &HashMap<String, T>, filter: &Filter) -> Vec<T> {
    let mut matched: Vec<T> = records
        .values()
        .filter(|r| filter.where_.as_ref().is_none_or(|w| w.matches(*r)))
        .cloned()
        .collect();

    if let Some(order) = &filter.order {
        matched.sort_by(|a, b| order.compare(a, b));
    }

    let skip = filter.skip.unwrap_or(0);
    if skip > 0 {
        matched = matched.into_iter().skip(skip).collect();
    }
    if let Some(limit) = filter.limit {
        matched.truncate(limit);
    }
    matched
}

fn count_matching<T: Queryable>(records: &HashMap<String, T>, where_: Option<&Where>) -> usize {
    records
        .values()
        .filter(|r| where_.is_none_or(|w| w.matches(*r)))
        .count()
}

#[async_trait]
impl Storage for MemoryStore {
    // ==================== Role Operations ====================

    async fn find_roles(&self, filter: &Filter) -> Result<Vec<Role>> {
        let roles = self.roles.read().await;
        Ok(apply_filter(&roles, filter))
    }

    async fn find_role_by_id(&self, id: &str) -> Result<Option<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.get(id).cloned())
    }

    async fn count_roles(&self, where_: Option<&Where>) -> Result<usize> {
        let roles = self.roles.read().await;
        Ok(count_matching(&roles, where_))
    }

    async fn create_role(&self, data: RoleData) -> Result<Role> {
        let mut roles = self.roles.write().await;
        let role = Role::new(data);
        roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    async fn find_or_create_role(&self, where_: &Where, data: RoleData) -> Result<(Role, bool)> {
        let mut roles = self.roles.write().await;
        if let Some(existing) = roles.values().find(|r| where_.matches(*r)) {
            return Ok((existing.clone(), false));
        }
        let role = Role::new(data);
        roles.insert(role.id.clone(), role.clone());
        Ok((role, true))
    }

    async fn destroy_roles(&self, where_: Option<&Where>) -> Result<usize> {
        let mut roles = self.roles.write().await;
        let before = roles.len();
        roles.retain(|_, r| !where_.is_none_or(|w| w.matches(r)));
        Ok(before - roles.len())
    }

    async fn save_role(&self, role: &Role) -> Result<Role> {
        let mut roles = self.roles.write().await;
        if !roles.contains_key(&role.id) {
            return Err(Error::not_found("role", "id", &role.id));
        }
        roles.insert(role.id.clone(), role.clone());
        Ok(role.clone())
    }

    // ==================== Mapping Operations ====================

    async fn find_mappings(&self, filter: &Filter) -> Result<Vec<RoleMapping>> {
        let mappings = self.mappings.read().await;
        Ok(apply_filter(&mappings, filter))
    }

    async fn count_mappings(&self, where_: Option<&Where>) -> Result<usize> {
        let mappings = self.mappings.read().await;
        Ok(count_matching(&mappings, where_))
    }

    async fn create_mappings(&self, items: Vec<MappingData>) -> Result<Vec<RoleMapping>> {
        let mut mappings = self.mappings.write().await;

        // Reject the whole batch on a uniqueness violation, against both
        // stored mappings and duplicates within the batch itself.
        let mut seen: Vec<(&str, &str)> = mappings
            .values()
            .map(|m| (m.user_id.as_str(), m.role_id.as_str()))
            .collect();
        for item in &items {
            let key = (item.user_id.as_str(), item.role_id.as_str());
            if seen.contains(&key) {
                return Err(Error::duplicate("role_mapping", "user_id", &item.user_id));
            }
            seen.push(key);
        }

        let created: Vec<RoleMapping> = items.into_iter().map(RoleMapping::new).collect();
        for mapping in &created {
            mappings.insert(mapping.id.clone(), mapping.clone());
        }
        Ok(created)
    }

    async fn destroy_mappings(&self, where_: Option<&Where>) -> Result<usize> {
        let mut mappings = self.mappings.write().await;
        let before = mappings.len();
        mappings.retain(|_, m| !where_.is_none_or(|w| w.matches(m)));
        Ok(before - mappings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::filter::Order;
    use serde_json::Value;

    #[tokio::test]
    async fn test_create_and_find_role() {
        let store = MemoryStore::new();
        let role = store
            .create_role(RoleData::new("admin").scope("org:1"))
            .await
            .unwrap();

        let fetched = store.find_role_by_id(&role.id).await.unwrap();
        assert_eq!(fetched.unwrap().name, "admin");

        let filter = Filter::new().where_clause(Where::eq("scope", "org:1"));
        let found = store.find_roles(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_null_scope_matching() {
        let store = MemoryStore::new();
        store.create_role(RoleData::new("member")).await.unwrap();
        store
            .create_role(RoleData::new("member").scope("org:1"))
            .await
            .unwrap();

        let filter = Filter::new().where_clause(Where::eq("scope", Value::Null));
        let found = store.find_roles(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].scope, None);
    }

    #[tokio::test]
    async fn test_find_or_create_is_keyed_by_where() {
        let store = MemoryStore::new();
        let where_ = Where::and([
            Where::eq("name", "member"),
            Where::eq("scope", Value::Null),
        ]);

        let (first, created) = store
            .find_or_create_role(&where_, RoleData::new("member"))
            .await
            .unwrap();
        assert!(created);

        let (second, created) = store
            .find_or_create_role(&where_, RoleData::new("member"))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(store.role_count().await, 1);
    }

    #[tokio::test]
    async fn test_save_role_requires_existing() {
        let store = MemoryStore::new();
        let mut role = store.create_role(RoleData::new("admin")).await.unwrap();
        role.parent_ids = vec!["p1".into()];
        let saved = store.save_role(&role).await.unwrap();
        assert_eq!(saved.parent_ids, vec!["p1".to_string()]);

        let ghost = Role::new(RoleData::new("ghost"));
        assert!(store.save_role(&ghost).await.is_err());
    }

    #[tokio::test]
    async fn test_destroy_roles_returns_count() {
        let store = MemoryStore::new();
        store.create_role(RoleData::new("a").scope("x")).await.unwrap();
        store.create_role(RoleData::new("b").scope("x")).await.unwrap();
        store.create_role(RoleData::new("c").scope("y")).await.unwrap();

        let removed = store
            .destroy_roles(Some(&Where::eq("scope", "x")))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.role_count().await, 1);
    }

    #[tokio::test]
    async fn test_mapping_uniqueness_enforced() {
        let store = MemoryStore::new();
        store
            .create_mappings(vec![MappingData::new("tom", "r1", None)])
            .await
            .unwrap();

        let result = store
            .create_mappings(vec![MappingData::new("tom", "r1", None)])
            .await;
        assert!(matches!(result, Err(Error::Duplicate { .. })));

        // Same user against another role is fine.
        store
            .create_mappings(vec![MappingData::new("tom", "r2", None)])
            .await
            .unwrap();
        assert_eq!(store.mapping_count().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_within_batch_rejected() {
        let store = MemoryStore::new();
        let result = store
            .create_mappings(vec![
                MappingData::new("tom", "r1", None),
                MappingData::new("tom", "r1", None),
            ])
            .await;
        assert!(result.is_err());
        assert_eq!(store.mapping_count().await, 0);
    }

    #[tokio::test]
    async fn test_limit_skip_order() {
        let store = MemoryStore::new();
        for name in ["delta", "alpha", "charlie", "bravo"] {
            store.create_role(RoleData::new(name)).await.unwrap();
        }

        let filter = Filter::new().order(Order::asc("name")).skip(1).limit(2);
        let found = store.find_roles(&filter).await.unwrap();
        let names: Vec<&str> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["bravo", "charlie"]);
    }
}
