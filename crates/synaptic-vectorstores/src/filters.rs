use serde::{Deserialize, Serialize};
use serde_json::Value;
use synaptic_core::SynapticError;

/// Comparison applied by a [`MetadataFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterOperator {
    #[default]
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "nin")]
    Nin,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "text_match")]
    TextMatch,
}

/// How the entries of a [`MetadataFilters`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCondition {
    #[default]
    And,
    Or,
}

/// A single `key <operator> value` constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub operator: FilterOperator,
}

impl MetadataFilter {
    pub fn new(key: impl Into<String>, value: impl Into<Value>, operator: FilterOperator) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            operator,
        }
    }

    /// Equality constraint.
    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, value, FilterOperator::Eq)
    }
}

/// Flat `key == value` constraint understood by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactMatchFilter {
    pub key: String,
    pub value: Value,
}

impl ExactMatchFilter {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Either a plain filter or a nested group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterEntry {
    Filter(MetadataFilter),
    Nested(MetadataFilters),
}

/// Structured metadata filter expression attached to a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilters {
    pub filters: Vec<FilterEntry>,
    #[serde(default)]
    pub condition: FilterCondition,
}

impl MetadataFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an AND group of equality filters.
    pub fn from_exact_matches<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            filters: pairs
                .into_iter()
                .map(|(k, v)| FilterEntry::Filter(MetadataFilter::eq(k, v)))
                .collect(),
            condition: FilterCondition::And,
        }
    }

    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filters.push(FilterEntry::Filter(filter));
        self
    }

    pub fn with_nested(mut self, nested: MetadataFilters) -> Self {
        self.filters.push(FilterEntry::Nested(nested));
        self
    }

    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Flatten into plain equality filters, in order.
    ///
    /// Fails if any entry is a nested group or uses an operator other than
    /// [`FilterOperator::Eq`]. The combining condition is not inspected.
    pub fn legacy_filters(&self) -> Result<Vec<ExactMatchFilter>, SynapticError> {
        self.filters
            .iter()
            .map(|entry| match entry {
                FilterEntry::Filter(f) if f.operator == FilterOperator::Eq => {
                    Ok(ExactMatchFilter::new(f.key.clone(), f.value.clone()))
                }
                FilterEntry::Filter(f) => Err(SynapticError::Validation(format!(
                    "only exact match filters are supported, got operator {:?} on '{}'",
                    f.operator, f.key
                ))),
                FilterEntry::Nested(_) => Err(SynapticError::Validation(
                    "nested metadata filters are not supported, use exact match filters"
                        .to_string(),
                )),
            })
            .collect()
    }
}
