//! Query filter model shared by the engine and storage adapters.
//!
//! Filters are deliberately narrow: field equality, set membership and
//! `and`/`or` combinators over JSON values, plus the usual pagination
//! knobs. `Where` evaluates against anything implementing `Queryable`,
//! so every adapter shares a single matching engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Field-by-name access for records a `Where` clause can match against.
///
/// Unknown field names return `Value::Null`, which lets an equality test
/// against `Null` double as an "is unset" test (the global scope).
pub trait Queryable {
    /// Returns the value of the named field.
    fn field(&self, name: &str) -> Value;
}

/// A where clause: equality, membership, and boolean combinators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Where {
    /// Field equals a value. Equality against `Value::Null` matches
    /// records where the field is unset.
    Eq { field: String, value: Value },
    /// Field is a member of the given set (`inq`).
    Inq { field: String, values: Vec<Value> },
    /// All sub-clauses match.
    And(Vec<Where>),
    /// At least one sub-clause matches.
    Or(Vec<Where>),
}

impl Where {
    /// Creates an equality clause.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a membership (`inq`) clause.
    pub fn inq<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::Inq {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a conjunction of clauses.
    pub fn and(clauses: impl IntoIterator<Item = Where>) -> Self {
        Self::And(clauses.into_iter().collect())
    }

    /// Creates a disjunction of clauses.
    pub fn or(clauses: impl IntoIterator<Item = Where>) -> Self {
        Self::Or(clauses.into_iter().collect())
    }

    /// Evaluates this clause against a record.
    pub fn matches<T: Queryable>(&self, record: &T) -> bool {
        match self {
            Self::Eq { field, value } => record.field(field) == *value,
            Self::Inq { field, values } => values.contains(&record.field(field)),
            Self::And(clauses) => clauses.iter().all(|w| w.matches(record)),
            Self::Or(clauses) => clauses.iter().any(|w| w.matches(record)),
        }
    }
}

/// Sort direction and field for query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The field to sort by.
    pub field: String,
    /// Whether to sort descending.
    pub descending: bool,
}

impl Order {
    /// Ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Parses an order string of the form `"field"`, `"field ASC"` or
    /// `"field DESC"`.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split_whitespace();
        let field = parts.next().unwrap_or_default().to_string();
        let descending = parts
            .next()
            .map(|d| d.eq_ignore_ascii_case("desc"))
            .unwrap_or(false);
        Self { field, descending }
    }

    /// Compares two records under this ordering.
    pub fn compare<T: Queryable>(&self, a: &T, b: &T) -> Ordering {
        let ord = compare_values(&a.field(&self.field), &b.field(&self.field));
        if self.descending { ord.reverse() } else { ord }
    }
}

/// Total order over the JSON values used in filters: nulls first, then
/// booleans, numbers, strings; mixed kinds compare by kind rank.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// A query filter: an optional where clause plus projection and
/// pagination hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// The where clause, if any.
    #[serde(rename = "where")]
    pub where_: Option<Where>,

    /// Field projection hint. Adapters may return whole records.
    #[serde(default)]
    pub fields: Vec<String>,

    /// Maximum number of records to return.
    pub limit: Option<usize>,

    /// Number of records to skip.
    pub skip: Option<usize>,

    /// Result ordering.
    pub order: Option<Order>,
}

impl Filter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the where clause.
    pub fn where_clause(mut self, where_: Where) -> Self {
        self.where_ = Some(where_);
        self
    }

    /// Sets the field projection hint.
    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the record limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of records to skip.
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the result ordering.
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, RoleData};

    #[test]
    fn test_eq_matches() {
        let role = Role::new(RoleData::new("admin").scope("org:1"));
        assert!(Where::eq("name", "admin").matches(&role));
        assert!(!Where::eq("name", "member").matches(&role));
    }

    #[test]
    fn test_null_eq_matches_unset_scope() {
        let global = Role::new(RoleData::new("admin"));
        let scoped = Role::new(RoleData::new("admin").scope("org:1"));
        let w = Where::eq("scope", Value::Null);
        assert!(w.matches(&global));
        assert!(!w.matches(&scoped));
    }

    #[test]
    fn test_inq_matches() {
        let role = Role::new(RoleData::new("leader"));
        let w = Where::inq("name", ["member", "leader"]);
        assert!(w.matches(&role));
        assert!(!Where::inq("name", ["member"]).matches(&role));
    }

    #[test]
    fn test_and_or_combinators() {
        let role = Role::new(RoleData::new("admin").scope("org:1"));
        let w = Where::and([
            Where::eq("scope", "org:1"),
            Where::or([
                Where::eq("name", "admin"),
                Where::eq("id", role.id.clone()),
            ]),
        ]);
        assert!(w.matches(&role));

        let w = Where::and([Where::eq("scope", "org:2"), Where::eq("name", "admin")]);
        assert!(!w.matches(&role));
    }

    #[test]
    fn test_order_parse() {
        assert_eq!(Order::parse("name"), Order::asc("name"));
        assert_eq!(Order::parse("name ASC"), Order::asc("name"));
        assert_eq!(Order::parse("name desc"), Order::desc("name"));
    }

    #[test]
    fn test_order_compare() {
        let a = Role::new(RoleData::new("alpha"));
        let b = Role::new(RoleData::new("beta"));
        assert_eq!(Order::asc("name").compare(&a, &b), Ordering::Less);
        assert_eq!(Order::desc("name").compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_filter_builder() {
        let f = Filter::new()
            .where_clause(Where::eq("scope", "x"))
            .fields(["id"])
            .limit(10)
            .skip(5)
            .order(Order::asc("name"));
        assert_eq!(f.fields, vec!["id".to_string()]);
        assert_eq!(f.limit, Some(10));
        assert_eq!(f.skip, Some(5));
    }
}
