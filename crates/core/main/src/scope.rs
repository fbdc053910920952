//! Scope composition.
//!
//! A scope is the partition key isolating role namespaces per tenant or
//! context. Callers hand the composer one or more heterogeneous inputs
//! (plain strings, numbers, identifiable entities, or untyped JSON) and
//! get back one canonical scope string, or `None` for the global
//! partition.

use rolegate_core::error::{Error, Result};
use serde_json::Value;

/// The scope a facade is bound to.
///
/// `Global` constrains queries to records whose scope is unset (`NULL`);
/// `Named` constrains them to one partition string. An unscoped facade
/// has no binding at all and sees every partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The global partition (`scope IS NULL`).
    Global,
    /// A named tenant/context partition.
    Named(String),
}

impl Scope {
    /// The scope as a query value: `Null` for the global partition.
    pub fn value(&self) -> Value {
        match self {
            Self::Global => Value::Null,
            Self::Named(s) => Value::from(s.clone()),
        }
    }

    /// The scope as an optional string slice.
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Named(s) => Some(s),
        }
    }

    /// The scope as the `Option<String>` stored on entities.
    pub fn to_option(&self) -> Option<String> {
        match self {
            Self::Global => None,
            Self::Named(s) => Some(s.clone()),
        }
    }
}

impl From<Option<String>> for Scope {
    fn from(scope: Option<String>) -> Self {
        scope.map_or(Self::Global, Self::Named)
    }
}

/// A single heterogeneous scope input.
#[derive(Debug, Clone)]
pub enum ScopeRef {
    /// A plain string, used verbatim.
    Text(String),
    /// A number, stringified.
    Number(i64),
    /// An identifiable entity: renders `"<model>:<id>"` when a model
    /// name is known, else just the id.
    Entity {
        /// The entity's model/type name, if any.
        model: Option<String>,
        /// The entity's identifier.
        id: String,
    },
    /// Untyped input from an API boundary.
    Value(Value),
}

impl ScopeRef {
    /// Creates an entity reference with a model name.
    pub fn entity(model: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Entity {
            model: Some(model.into()),
            id: id.into(),
        }
    }

    /// Converts this reference to its scope token.
    fn token(&self) -> Result<String> {
        match self {
            Self::Text(s) => Ok(s.clone()),
            Self::Number(n) => Ok(n.to_string()),
            Self::Entity { model, id } => Ok(match model {
                Some(model) => format!("{model}:{id}"),
                None => id.clone(),
            }),
            Self::Value(value) => value_token(value),
        }
    }
}

fn value_token(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Object(map) => match map.get("id") {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(Error::unsupported(format!(
                "cannot identify scope target: {value}"
            ))),
        },
        _ => Err(Error::unsupported(format!(
            "cannot identify scope target: {value}"
        ))),
    }
}

impl From<&str> for ScopeRef {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ScopeRef {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ScopeRef {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for ScopeRef {
    fn from(n: i32) -> Self {
        Self::Number(n as i64)
    }
}

impl From<Value> for ScopeRef {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Composes heterogeneous scope inputs into one canonical scope string.
///
/// No inputs (or inputs that all tokenize to the empty string) yield
/// `None`, the global partition. Tokens are joined with `:` in argument
/// order. A non-identifiable, non-primitive input fails with
/// `Error::UnsupportedReference`.
pub fn compose<I>(args: I) -> Result<Option<String>>
where
    I: IntoIterator,
    I::Item: Into<ScopeRef>,
{
    let mut tokens = Vec::new();
    for arg in args {
        let token = arg.into().token()?;
        if !token.is_empty() {
            tokens.push(token);
        }
    }
    if tokens.is_empty() {
        return Ok(None);
    }
    Ok(Some(tokens.join(":")))
}
