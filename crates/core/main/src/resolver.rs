//! Role reference resolution.
//!
//! Resolution turns a mixed bag of role references into concrete,
//! deduplicated, scope-filtered entities. Unresolved keys are fetched
//! from storage in one batched query matching either id or name;
//! unknown keys simply resolve to nothing.

use rolegate_core::error::Result;
use rolegate_core::filter::{Filter, Where};
use rolegate_core::types::Role;
use serde_json::Value;

use crate::refs::{RoleRef, partition_refs};
use crate::roles::Roles;

/// How resolved roles are filtered.
pub(crate) enum ResolveFilter<'a> {
    /// No filtering (unscoped facade).
    Unfiltered,
    /// Keep roles in exactly this partition; also constrains the batch
    /// fetch.
    Scope(Option<&'a str>),
    /// Keep roles matching an arbitrary predicate; the batch fetch is
    /// unconstrained in this mode.
    Predicate(&'a (dyn Fn(&Role) -> bool + Sync)),
}

impl ResolveFilter<'_> {
    fn keep(&self, role: &Role) -> bool {
        match self {
            Self::Unfiltered => true,
            Self::Scope(scope) => role.scope.as_deref() == *scope,
            Self::Predicate(pred) => pred(role),
        }
    }
}

impl Roles {
    /// Resolves role references to entities under this facade's scope.
    ///
    /// Keys (ids or names) are fetched in one batched query; entities
    /// pass through. The result is deduplicated by id, first occurrence
    /// winning, in input-then-fetched order. Callers must not rely on
    /// ordering beyond that.
    pub async fn resolve<R>(&self, refs: R) -> Result<Vec<Role>>
    where
        R: IntoIterator,
        R::Item: Into<RoleRef>,
    {
        let filter = match &self.scope {
            Some(scope) => ResolveFilter::Scope(scope.as_deref()),
            None => ResolveFilter::Unfiltered,
        };
        self.resolve_with(refs.into_iter().map(Into::into).collect(), &filter)
            .await
    }

    pub(crate) async fn resolve_with(
        &self,
        refs: Vec<RoleRef>,
        filter: &ResolveFilter<'_>,
    ) -> Result<Vec<Role>> {
        let (keys, entities) = partition_refs(refs);

        let fetched = if keys.is_empty() {
            Vec::new()
        } else {
            let key_clause = Where::or([
                Where::inq("id", keys.clone()),
                Where::inq("name", keys),
            ]);
            let where_ = match filter {
                ResolveFilter::Scope(scope) => Where::and([
                    Where::eq(
                        "scope",
                        scope.map(Value::from).unwrap_or(Value::Null),
                    ),
                    key_clause,
                ]),
                _ => key_clause,
            };
            self.storage
                .find_roles(&Filter::new().where_clause(where_))
                .await?
        };

        let mut resolved: Vec<Role> = Vec::new();
        for role in entities.into_iter().chain(fetched) {
            if !resolved.iter().any(|r| r.id == role.id) {
                resolved.push(role);
            }
        }
        resolved.retain(|r| filter.keep(r));
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::RoleRef;
    use rolegate_adapter_memory::MemoryStore;
    use serde_json::json;

    async fn engine_with_roles() -> (Roles, Role, Role) {
        let rs = Roles::new(MemoryStore::new()).scoped(["X"]).unwrap();
        let admin = rs.add("admin").await.unwrap();
        let member = rs.add("member").await.unwrap();
        (rs, admin, member)
    }

    #[tokio::test]
    async fn test_resolve_dedupes_mixed_references() {
        let (rs, admin, _) = engine_with_roles().await;
        let refs = vec![
            RoleRef::from(&admin),
            RoleRef::from(admin.id.as_str()),
            RoleRef::from(admin.name.as_str()),
        ];
        let resolved = rs.resolve(refs).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, admin.id);
    }

    #[tokio::test]
    async fn test_resolve_by_id_and_name() {
        let (rs, admin, member) = engine_with_roles().await;
        let resolved = rs
            .resolve([admin.id.as_str(), member.name.as_str()])
            .await
            .unwrap();
        let mut ids: Vec<&str> = resolved.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        let mut expected = vec![admin.id.as_str(), member.id.as_str()];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_unknown_keys_resolve_to_nothing() {
        let (rs, _, _) = engine_with_roles().await;
        let resolved = rs.resolve(["no-such-role"]).await.unwrap();
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_filters_foreign_scope() {
        let (rs, admin, _) = engine_with_roles().await;
        let other = rs.scoped(["Y"]).unwrap();
        // Entity from X handed to a Y-scoped facade is filtered out.
        let resolved = other.resolve([RoleRef::from(&admin)]).await.unwrap();
        assert!(resolved.is_empty());
        // Name lookup is constrained to Y as well.
        let resolved = other.resolve(["admin"]).await.unwrap();
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_unscoped_resolve_sees_all_partitions() {
        let (rs, _, _) = engine_with_roles().await;
        let unscoped = Roles {
            storage: rs.storage.clone(),
            scope: None,
        };
        let resolved = unscoped.resolve(["admin"]).await.unwrap();
        assert_eq!(resolved.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_references_are_dropped() {
        let (rs, admin, _) = engine_with_roles().await;
        let refs = vec![
            RoleRef::from(json!(42)),
            RoleRef::from(json!({"bogus": true})),
            RoleRef::from(admin.id.as_str()),
        ];
        let resolved = rs.resolve(refs).await.unwrap();
        assert_eq!(resolved.len(), 1);
    }
}
