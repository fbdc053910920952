//! Role↔principal mapping operations.
//!
//! Mappings are created per (role, user) pair with the role's own scope
//! denormalized onto the record. Bulk unassignment supports a wildcard
//! on either side; membership queries come in direct and recursive
//! flavors.

use rolegate_core::error::Result;
use rolegate_core::filter::{Filter, Where};
use rolegate_core::types::{MappingData, RoleMapping};
use tracing::debug;

use crate::refs::{RoleRef, Selector, UserRef, normalize_users};
use crate::roles::Roles;

impl Roles {
    /// Assigns every resolved role to every normalized user.
    ///
    /// Either side resolving to nothing produces no mappings and no
    /// error. Returns the created mappings.
    pub async fn assign<R, U>(&self, roles: R, users: U) -> Result<Vec<RoleMapping>>
    where
        R: IntoIterator,
        R::Item: Into<RoleRef>,
        U: IntoIterator,
        U::Item: Into<UserRef>,
    {
        let roles = self.resolve(roles).await?;
        let users = normalize_users(users);
        if roles.is_empty() || users.is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<MappingData> = roles
            .iter()
            .flat_map(|role| {
                users
                    .iter()
                    .map(|user| MappingData::new(user.clone(), role.id.clone(), role.scope.clone()))
            })
            .collect();
        debug!(mappings = items.len(), "assigning roles");
        self.storage.create_mappings(items).await
    }

    /// Removes mappings matching the role and user selectors, returning
    /// the number removed.
    ///
    /// `Selector::All` on a side drops that side's constraint. A
    /// non-wildcard users selector that normalizes to nothing also adds
    /// no user constraint; the delete then runs with the remaining
    /// scope/role constraints alone.
    pub async fn unassign(
        &self,
        roles: Selector<RoleRef>,
        users: Selector<UserRef>,
    ) -> Result<usize> {
        let mut clauses: Vec<Where> = Vec::new();
        if let Some(scope_w) = self.scope_where() {
            clauses.push(scope_w);
        }
        if let Selector::Items(refs) = roles {
            let ids: Vec<String> = self
                .resolve(refs)
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect();
            clauses.push(Where::inq("role_id", ids));
        }
        if let Selector::Items(refs) = users {
            let ids = normalize_users(refs);
            if !ids.is_empty() {
                clauses.push(Where::inq("user_id", ids));
            }
        }

        let where_ = combine(clauses);
        let removed = self.storage.destroy_mappings(where_.as_ref()).await?;
        debug!(removed, "unassigned roles");
        Ok(removed)
    }

    /// Role ids mapped to a user within scope, deduplicated. With
    /// `recursively`, the ancestor closure of the direct set is unioned
    /// in (direct ids first).
    pub async fn find_user_roles(
        &self,
        user: impl Into<UserRef>,
        recursively: bool,
    ) -> Result<Vec<String>> {
        let Some(user_id) = user.into().normalize() else {
            return Ok(Vec::new());
        };

        let mut clauses = vec![Where::eq("user_id", user_id)];
        if let Some(scope_w) = self.scope_where() {
            clauses.insert(0, scope_w);
        }
        let filter = Filter::new().where_clause(all_of(clauses));
        let mappings = self.storage.find_mappings(&filter).await?;

        let mut role_ids: Vec<String> = Vec::new();
        for m in mappings {
            if !role_ids.contains(&m.role_id) {
                role_ids.push(m.role_id);
            }
        }

        if recursively {
            let closure = self
                .recurse_parent_ids(role_ids.iter().map(RoleRef::from))
                .await?;
            for id in closure {
                if !role_ids.contains(&id) {
                    role_ids.push(id);
                }
            }
        }
        Ok(role_ids)
    }

    /// User ids mapped to the referenced roles within scope,
    /// deduplicated.
    pub async fn find_role_users<R>(&self, roles: R) -> Result<Vec<String>>
    where
        R: IntoIterator,
        R::Item: Into<RoleRef>,
    {
        let mappings = self.mappings_for_roles(roles).await?;
        let mut user_ids: Vec<String> = Vec::new();
        for m in mappings {
            if !user_ids.contains(&m.user_id) {
                user_ids.push(m.user_id);
            }
        }
        Ok(user_ids)
    }

    /// Raw mappings for the given users within scope.
    pub async fn find_roles_by_users<U>(&self, users: U) -> Result<Vec<RoleMapping>>
    where
        U: IntoIterator,
        U::Item: Into<UserRef>,
    {
        let user_ids = normalize_users(users);
        let mut clauses = vec![Where::inq("user_id", user_ids)];
        if let Some(scope_w) = self.scope_where() {
            clauses.insert(0, scope_w);
        }
        let filter = Filter::new().where_clause(all_of(clauses));
        self.storage.find_mappings(&filter).await
    }

    /// Raw mappings for the referenced roles within scope.
    pub async fn find_users_by_roles<R>(&self, roles: R) -> Result<Vec<RoleMapping>>
    where
        R: IntoIterator,
        R::Item: Into<RoleRef>,
    {
        self.mappings_for_roles(roles).await
    }

    /// Whether the user holds **every** referenced role (AND semantics).
    ///
    /// An empty user or an empty resolved role set is `false` without a
    /// count query.
    pub async fn has_roles<R>(&self, user: impl Into<UserRef>, roles: R) -> Result<bool>
    where
        R: IntoIterator,
        R::Item: Into<RoleRef>,
    {
        let role_ids: Vec<String> = self
            .resolve(roles)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let Some(user_id) = user.into().normalize() else {
            return Ok(false);
        };
        if role_ids.is_empty() {
            return Ok(false);
        }

        let expected = role_ids.len();
        let mut clauses = vec![
            Where::eq("user_id", user_id),
            Where::inq("role_id", role_ids),
        ];
        if let Some(scope_w) = self.scope_where() {
            clauses.insert(0, scope_w);
        }
        let count = self
            .storage
            .count_mappings(Some(&Where::and(clauses)))
            .await?;
        Ok(count == expected)
    }

    async fn mappings_for_roles<R>(&self, roles: R) -> Result<Vec<RoleMapping>>
    where
        R: IntoIterator,
        R::Item: Into<RoleRef>,
    {
        let role_ids: Vec<String> = self
            .resolve(roles)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let mut clauses = vec![Where::inq("role_id", role_ids)];
        if let Some(scope_w) = self.scope_where() {
            clauses.insert(0, scope_w);
        }
        let filter = Filter::new().where_clause(all_of(clauses));
        self.storage.find_mappings(&filter).await
    }
}

/// Folds clauses into a single where clause, if any.
fn combine(mut clauses: Vec<Where>) -> Option<Where> {
    match clauses.len() {
        0 => None,
        1 => Some(clauses.remove(0)),
        _ => Some(Where::and(clauses)),
    }
}

/// Folds a known non-empty clause list into a single where clause.
fn all_of(mut clauses: Vec<Where>) -> Where {
    if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        Where::and(clauses)
    }
}
