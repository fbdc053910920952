//! Inheritance-graph operations.
//!
//! Parent edges live on the child role (`parent_ids`). Mutations resolve
//! their parent arguments within the subject's own scope, excluding the
//! subject itself, so a role can never become its own parent. The stored
//! graph may still contain cycles through longer chains; closure
//! computation guards against them with a visited set.

use chrono::Utc;
use rolegate_core::error::{Error, Result};
use rolegate_core::types::Role;
use serde_json::Value;
use tracing::debug;

use crate::refs::RoleRef;
use crate::resolver::ResolveFilter;
use crate::roles::Roles;

impl Roles {
    /// Materializes the subject of an inheritance mutation. Unlike
    /// parent resolution, a missing subject is an error: there is
    /// nothing to mutate.
    async fn subject_role(&self, role: RoleRef) -> Result<Role> {
        match role {
            RoleRef::Key(id) => self
                .storage
                .find_role_by_id(&id)
                .await?
                .ok_or_else(|| Error::not_found("role", "id", id)),
            RoleRef::Entity(role) => Ok(role),
            RoleRef::Value(Value::String(id)) => self
                .storage
                .find_role_by_id(&id)
                .await?
                .ok_or_else(|| Error::not_found("role", "id", id)),
            RoleRef::Value(value) => serde_json::from_value::<Role>(value).map_err(|_| {
                Error::validation("role argument must be an id string or a role object")
            }),
        }
    }

    /// Resolves parent references to ids within the subject's scope,
    /// excluding the subject itself.
    async fn resolve_parent_ids(&self, role: &Role, parents: Vec<RoleRef>) -> Result<Vec<String>> {
        let self_id = role.id.clone();
        let scope = role.scope.clone();
        let pred = move |p: &Role| p.id != self_id && p.scope == scope;
        let resolved = self
            .resolve_with(parents, &ResolveFilter::Predicate(&pred))
            .await?;
        Ok(resolved.into_iter().map(|r| r.id).collect())
    }

    /// Adds parents to a role's inheritance, preserving existing edges.
    pub async fn inherit<R, P>(&self, role: R, parents: P) -> Result<Role>
    where
        R: Into<RoleRef>,
        P: IntoIterator,
        P::Item: Into<RoleRef>,
    {
        let mut role = self.subject_role(role.into()).await?;
        let parent_ids = self
            .resolve_parent_ids(&role, parents.into_iter().map(Into::into).collect())
            .await?;
        for id in parent_ids {
            if !role.parent_ids.contains(&id) {
                role.parent_ids.push(id);
            }
        }
        role.updated_at = Utc::now();
        debug!(id = %role.id, parents = role.parent_ids.len(), "inherit");
        self.storage.save_role(&role).await
    }

    /// Removes parents from a role's inheritance.
    pub async fn uninherit<R, P>(&self, role: R, parents: P) -> Result<Role>
    where
        R: Into<RoleRef>,
        P: IntoIterator,
        P::Item: Into<RoleRef>,
    {
        let mut role = self.subject_role(role.into()).await?;
        let parent_ids = self
            .resolve_parent_ids(&role, parents.into_iter().map(Into::into).collect())
            .await?;
        role.parent_ids.retain(|id| !parent_ids.contains(id));
        role.updated_at = Utc::now();
        debug!(id = %role.id, parents = role.parent_ids.len(), "uninherit");
        self.storage.save_role(&role).await
    }

    /// Replaces a role's parents wholesale.
    pub async fn set_inherits<R, P>(&self, role: R, parents: P) -> Result<Role>
    where
        R: Into<RoleRef>,
        P: IntoIterator,
        P::Item: Into<RoleRef>,
    {
        let mut role = self.subject_role(role.into()).await?;
        role.parent_ids = self
            .resolve_parent_ids(&role, parents.into_iter().map(Into::into).collect())
            .await?;
        role.updated_at = Utc::now();
        debug!(id = %role.id, parents = role.parent_ids.len(), "set inherits");
        self.storage.save_role(&role).await
    }

    /// First-level parent ids of the referenced roles, deduplicated.
    pub async fn get_parent_ids<R>(&self, refs: R) -> Result<Vec<String>>
    where
        R: IntoIterator,
        R::Item: Into<RoleRef>,
    {
        let roles = self.resolve(refs).await?;
        let mut ids: Vec<String> = Vec::new();
        for role in roles {
            for id in role.parent_ids {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    /// First-level parent roles of the referenced roles.
    pub async fn get_parents<R>(&self, refs: R) -> Result<Vec<Role>>
    where
        R: IntoIterator,
        R::Item: Into<RoleRef>,
    {
        let ids = self.get_parent_ids(refs).await?;
        self.resolve(ids).await
    }

    /// The full ancestor closure of the referenced roles.
    ///
    /// Breadth-first and level-synchronized: each level's parents are
    /// fully fetched before the next expansion, and an id already in the
    /// answer is never expanded again. The revisit guard makes this
    /// terminate on cyclic graphs; the answer is in discovery order but
    /// is a set semantically.
    pub async fn recurse_parent_ids<R>(&self, refs: R) -> Result<Vec<String>>
    where
        R: IntoIterator,
        R::Item: Into<RoleRef>,
    {
        let mut answer: Vec<String> = Vec::new();
        let mut frontier: Vec<RoleRef> = refs.into_iter().map(Into::into).collect();
        loop {
            let parent_ids = self.get_parent_ids(frontier).await?;
            let fresh: Vec<String> = parent_ids
                .into_iter()
                .filter(|id| !answer.contains(id))
                .collect();
            if fresh.is_empty() {
                return Ok(answer);
            }
            answer.extend(fresh.iter().cloned());
            frontier = fresh.into_iter().map(RoleRef::Key).collect();
        }
    }
}
