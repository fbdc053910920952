//! The scoped `Roles` facade.
//!
//! A `Roles` value binds a storage handle and an optional scope; every
//! operation it exposes is constrained to that scope. Facades are cheap
//! to clone and rebind (`scoped`, `global`), sharing one storage handle.

use std::sync::Arc;

use rolegate_core::error::{Error, Result};
use rolegate_core::filter::{Filter, Where};
use rolegate_core::traits::Storage;
use rolegate_core::types::{Role, RoleData};
use tracing::debug;

use crate::scope::{Scope, ScopeRef, compose};

/// The scoped entry point to the role engine.
///
/// # Example
///
/// ```rust,ignore
/// use rolegate::Roles;
/// use rolegate_adapter_memory::MemoryStore;
///
/// let roles = Roles::new(MemoryStore::new());
/// let org = roles.scoped(["org:1"])?;
/// let admin = org.add("admin").await?;
/// ```
#[derive(Clone)]
pub struct Roles {
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) scope: Option<Scope>,
}

/// Builder for a `Roles` facade.
pub struct RolesBuilder {
    storage: Option<Arc<dyn Storage>>,
    scope: Option<Scope>,
}

impl RolesBuilder {
    fn new() -> Self {
        Self {
            storage: None,
            scope: None,
        }
    }

    /// Sets the storage backend.
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Binds a scope at construction time.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Builds the facade. Fails when no storage backend was set.
    pub fn build(self) -> Result<Roles> {
        let storage = self
            .storage
            .ok_or_else(|| Error::validation("a storage backend is required"))?;
        Ok(Roles {
            storage,
            scope: self.scope,
        })
    }
}

impl Roles {
    /// Creates an unscoped facade over a storage backend.
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
            scope: None,
        }
    }

    /// Creates a builder.
    pub fn builder() -> RolesBuilder {
        RolesBuilder::new()
    }

    /// The bound scope, if any.
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// Whether this facade is bound to a scope (global counts as bound).
    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    /// Returns a facade bound to the scope composed from `args`,
    /// sharing this facade's storage. Empty args bind the global
    /// partition.
    pub fn scoped<I>(&self, args: I) -> Result<Roles>
    where
        I: IntoIterator,
        I::Item: Into<ScopeRef>,
    {
        let scope = compose(args)?;
        Ok(Roles {
            storage: self.storage.clone(),
            scope: Some(Scope::from(scope)),
        })
    }

    /// Returns a facade bound to the global partition.
    pub fn global(&self) -> Roles {
        Roles {
            storage: self.storage.clone(),
            scope: Some(Scope::Global),
        }
    }

    /// The scope constraint clause, when this facade is bound.
    pub(crate) fn scope_where(&self) -> Option<Where> {
        self.scope
            .as_ref()
            .map(|scope| Where::eq("scope", scope.value()))
    }

    // ==================== Basic CRUD ====================

    /// Finds roles matching a filter, intersected with the bound scope.
    pub async fn find(&self, mut filter: Filter) -> Result<Vec<Role>> {
        if let Some(scope_w) = self.scope_where() {
            filter.where_ = Some(match filter.where_.take() {
                Some(w) => Where::and([w, scope_w]),
                None => scope_w,
            });
        }
        self.storage.find_roles(&filter).await
    }

    /// Counts roles matching a where clause, intersected with the bound
    /// scope.
    pub async fn count(&self, where_: Option<Where>) -> Result<usize> {
        let where_ = match (self.scope_where(), where_) {
            (Some(scope_w), Some(w)) => Some(Where::and([w, scope_w])),
            (Some(scope_w), None) => Some(scope_w),
            (None, w) => w,
        };
        self.storage.count_roles(where_.as_ref()).await
    }

    /// Removes roles and, first, every mapping referencing them.
    ///
    /// Two sequential deletes, mappings before roles, with no
    /// transaction; a failure in between strands mappings rather than
    /// roles. Returns the number of roles removed.
    pub async fn remove(&self, target: impl Into<RemoveTarget>) -> Result<usize> {
        let where_ = match (self.scope_where(), target.into()) {
            (Some(scope_w), RemoveTarget::Key(key)) => Some(Where::and([
                scope_w,
                Where::or([
                    Where::eq("name", key.clone()),
                    Where::eq("id", key),
                ]),
            ])),
            (Some(scope_w), RemoveTarget::Where(w)) => Some(Where::and([w, scope_w])),
            (Some(scope_w), RemoveTarget::All) => Some(scope_w),
            (None, RemoveTarget::Key(_)) => {
                return Err(Error::validation(
                    "removing by name or id requires a scoped facade",
                ));
            }
            (None, RemoveTarget::Where(w)) => Some(w),
            (None, RemoveTarget::All) => None,
        };

        let mut filter = Filter::new().fields(["id"]);
        if let Some(w) = where_.clone() {
            filter = filter.where_clause(w);
        }
        let ids: Vec<String> = self
            .storage
            .find_roles(&filter)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        debug!(roles = ids.len(), "removing roles and their mappings");
        self.storage
            .destroy_mappings(Some(&Where::inq("role_id", ids)))
            .await?;
        self.storage.destroy_roles(where_.as_ref()).await
    }

    /// Adds a role with find-or-create semantics keyed by name and
    /// scope.
    ///
    /// A scoped facade accepts a bare name and stamps its bound scope on
    /// the role; an unscoped facade requires full `RoleData`.
    pub async fn add(&self, input: impl Into<RoleInput>) -> Result<Role> {
        let data = match (self.scope.as_ref(), input.into()) {
            (Some(scope), RoleInput::Name(name)) => RoleData {
                name,
                scope: scope.to_option(),
            },
            (Some(scope), RoleInput::Data(data)) => RoleData {
                name: data.name,
                scope: scope.to_option(),
            },
            (None, RoleInput::Name(_)) => {
                return Err(Error::validation(
                    "adding by bare name requires a scoped facade",
                ));
            }
            (None, RoleInput::Data(data)) => data,
        };

        let where_ = Where::and([
            Where::eq("name", data.name.clone()),
            Where::eq(
                "scope",
                data.scope
                    .clone()
                    .map(serde_json::Value::from)
                    .unwrap_or(serde_json::Value::Null),
            ),
        ]);
        let (role, created) = self.storage.find_or_create_role(&where_, data).await?;
        if created {
            debug!(id = %role.id, name = %role.name, "created role");
        }
        Ok(role)
    }
}

/// Target of a `remove` call.
#[derive(Debug, Clone)]
pub enum RemoveTarget {
    /// A name-or-id shorthand; only valid on a scoped facade.
    Key(String),
    /// An explicit where clause.
    Where(Where),
    /// Every role visible to the facade.
    All,
}

impl From<&str> for RemoveTarget {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for RemoveTarget {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<Where> for RemoveTarget {
    fn from(w: Where) -> Self {
        Self::Where(w)
    }
}

/// Input to an `add` call.
#[derive(Debug, Clone)]
pub enum RoleInput {
    /// A bare name; only valid on a scoped facade.
    Name(String),
    /// A full creation payload.
    Data(RoleData),
}

impl From<&str> for RoleInput {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

impl From<String> for RoleInput {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

impl From<RoleData> for RoleInput {
    fn from(data: RoleData) -> Self {
        Self::Data(data)
    }
}
