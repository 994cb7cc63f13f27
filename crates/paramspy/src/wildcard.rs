//! Wildcard policy: what "any value" means for a given parameter.
//!
//! An assertion enters wildcard mode when its last positional argument is
//! [`ANY_PARAM`]. Each operation then decides, per key, whether the literal
//! comparison value is replaced by a pattern.

use crate::params::{keys, ParamValue, ParameterMap};
use crate::query::Arg;
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel meaning "match anything" in assertion arguments.
pub const ANY_PARAM: &str = "ANY_PARAM";

/// Stand-in direction used to build the reference query of a
/// direction-wildcard `order_by`.
pub(crate) const PLACEHOLDER_DIRECTION: &str = "asc";

/// Matches any non-empty value.
pub(crate) static ANY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(".").expect("static pattern is valid"));

/// How an operation substitutes patterns for literal values in wildcard mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardPolicy {
    /// Values are always compared literally.
    Exact,
    /// The listed keys accept any non-empty value.
    AnyValue(&'static [&'static str]),
    /// `sort` accepts any value (field wildcard) or any direction for the
    /// asserted field (direction wildcard).
    SortDirection,
}

/// True iff the last supplied argument is the `ANY_PARAM` sentinel.
pub fn is_wildcard(args: &[Arg]) -> bool {
    args.last().is_some_and(Arg::is_any)
}

/// Pattern restricting multi-value comparisons to the asserted field.
pub(crate) fn field_pattern(field: &str) -> Regex {
    Regex::new(&regex::escape(field)).unwrap_or_else(|_| ANY_VALUE.clone())
}

/// Keep values that mention the field and strip everything from the first
/// colon onward, leaving only the `field` prefix of `field:value` entries.
pub(crate) fn filter_values(values: Vec<String>, field: &Regex) -> Vec<String> {
    values
        .into_iter()
        .filter(|value| field.is_match(value))
        .map(|value| match value.find(':') {
            Some(colon) => value[..colon].to_string(),
            None => value,
        })
        .collect()
}

/// Replace the placeholder direction in the reference `sort` value with the
/// sentinel. Returns a new map; the input is left untouched.
pub(crate) fn with_direction_wildcard(params: &ParameterMap) -> ParameterMap {
    let mut rewritten = params.clone();
    if let Some(ParamValue::Text(sort)) = rewritten.get_mut(keys::SORT) {
        *sort = sort.replace(PLACEHOLDER_DIRECTION, ANY_PARAM);
    }
    rewritten
}

/// Compile a value containing sentinels into a pattern where each sentinel
/// matches any run of characters. The remaining text matches literally.
pub(crate) fn sentinel_pattern(value: &str) -> Regex {
    let pieces: Vec<String> = value.split(ANY_PARAM).map(regex::escape).collect();
    Regex::new(&pieces.join(".*")).unwrap_or_else(|_| ANY_VALUE.clone())
}
