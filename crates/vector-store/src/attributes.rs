use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar attribute value. The index deliberately supports no nested or
/// null values; list-valued domain attributes must be flattened to a
/// scalar before storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl AttributeValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

pub type AttributeMap = BTreeMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq)]
enum FilterClause {
    Eq(String, AttributeValue),
    In(String, Vec<AttributeValue>),
}

/// Conjunction of equality and set-membership tests over scalar
/// attributes. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeFilter {
    clauses: Vec<FilterClause>,
}

impl AttributeFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.clauses.push(FilterClause::Eq(key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_in<V: Into<AttributeValue>>(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.clauses.push(FilterClause::In(
            key.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn matches(&self, attributes: &AttributeMap) -> bool {
        self.clauses.iter().all(|clause| match clause {
            FilterClause::Eq(key, value) => attributes.get(key) == Some(value),
            FilterClause::In(key, values) => attributes
                .get(key)
                .is_some_and(|actual| values.contains(actual)),
        })
    }
}
