//! Normalized parameter maps extracted from built queries.
//!
//! Every comparison in this crate operates on a [`ParameterMap`]: the flat,
//! Solr-style `key => value(s)` view of a query. Keys are plain strings; the
//! value is either a scalar or an ordered list of strings.

use crate::query::Query;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Solr parameter keys produced by [`Query::to_params`].
pub mod keys {
    pub const FILTER_QUERY: &str = "fq";
    pub const QUERY: &str = "q";
    pub const QUERY_FIELDS: &str = "qf";
    pub const DEF_TYPE: &str = "defType";
    pub const BOOST_QUERY: &str = "bq";
    pub const BOOST_FUNCTION: &str = "bf";
    pub const FACET: &str = "facet";
    pub const FACET_FIELD: &str = "facet.field";
    pub const SORT: &str = "sort";
    pub const ROWS: &str = "rows";
    pub const START: &str = "start";
}

/// A single parameter value.
///
/// Scalars keep their type: `Integer(30)` and `Text("30")` are different
/// values and never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn text(value: impl Into<String>) -> Self {
        ParamValue::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ParamValue::List(_))
    }

    /// View the value as a sequence. Scalars become a one-element sequence.
    pub fn to_values(&self) -> Vec<String> {
        match self {
            ParamValue::List(values) => values.clone(),
            ParamValue::Text(value) => vec![value.clone()],
            ParamValue::Integer(value) => vec![value.to_string()],
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(value) => write!(f, "{value}"),
            ParamValue::Text(value) => f.write_str(value),
            ParamValue::List(values) => f.write_str(&render_list(values)),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values)
    }
}

/// Normalized `key => value(s)` view of a query.
pub type ParameterMap = BTreeMap<String, ParamValue>;

/// Extract the parameter map of a built query.
///
/// Delegates to the query's own serialization; the result is a fresh map
/// owned by the caller.
pub fn extract_params(query: &Query) -> ParameterMap {
    query.to_params()
}

/// Render an optional value for diagnostics. Absent values render empty.
pub(crate) fn render_value(value: Option<&ParamValue>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Render a list as `["a", "b"]`.
pub(crate) fn render_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
    format!("[{}]", quoted.join(", "))
}
