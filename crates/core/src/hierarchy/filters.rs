//! Person filter predicates for subtree queries.
//!
//! A [`FilterCriteria`] is an ordered sequence of equality predicates. Its JSON
//! form is part of the subtree cache key, so two criteria holding the same
//! predicates in a different order are distinct keys. Call
//! [`FilterCriteria::canonicalized`] before keying to opt into
//! order-insensitive entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::Person;

/// An equality predicate over a single person field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonFilter {
    JobTitle(String),
    FirstName(String),
}

impl PersonFilter {
    /// Builds a predicate from a wire field name (`jobTitle`, `firstName`).
    pub fn from_field(field: &str, value: impl Into<String>) -> Result<Self, FilterError> {
        match field {
            "jobTitle" => Ok(Self::JobTitle(value.into())),
            "firstName" => Ok(Self::FirstName(value.into())),
            other => Err(FilterError::UnknownField(other.to_string())),
        }
    }

    /// Returns the wire field name of this predicate.
    pub fn field(&self) -> &'static str {
        match self {
            Self::JobTitle(_) => "jobTitle",
            Self::FirstName(_) => "firstName",
        }
    }

    /// Returns the value the field must equal.
    pub fn value(&self) -> &str {
        match self {
            Self::JobTitle(v) | Self::FirstName(v) => v,
        }
    }

    /// Returns true if the person satisfies this predicate.
    pub fn matches(&self, person: &Person) -> bool {
        match self {
            Self::JobTitle(v) => person.job_title == *v,
            Self::FirstName(v) => person.first_name == *v,
        }
    }

    fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(self.field().to_string(), Value::String(self.value().to_string()));
        Value::Object(object)
    }
}

/// Ordered, conjunctive set of person predicates. Empty means "match all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria(Vec<PersonFilter>);

impl FilterCriteria {
    /// Creates criteria that match every person.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate, keeping insertion order.
    pub fn with(mut self, filter: PersonFilter) -> Self {
        self.0.push(filter);
        self
    }

    /// Builds criteria from `(field, value)` pairs in the order given.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(field, value)| PersonFilter::from_field(field.as_ref(), value))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonFilter> {
        self.0.iter()
    }

    /// Returns true if the person satisfies every predicate.
    pub fn matches(&self, person: &Person) -> bool {
        self.0.iter().all(|filter| filter.matches(person))
    }

    /// Returns a copy with predicates sorted, so equal sets share one key.
    pub fn canonicalized(&self) -> Self {
        let mut filters = self.0.clone();
        filters.sort();
        filters.dedup();
        Self(filters)
    }

    /// Compact JSON form used inside cache keys, e.g. `[{"jobTitle":"eng"}]`.
    pub fn to_json(&self) -> String {
        Value::Array(self.0.iter().map(PersonFilter::to_json).collect()).to_string()
    }
}

impl FromIterator<PersonFilter> for FilterCriteria {
    fn from_iter<T: IntoIterator<Item = PersonFilter>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
