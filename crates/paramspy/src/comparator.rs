//! Value comparison between actual and reference parameters.
//!
//! Each function returns the list of unmet expectations; an empty list means
//! the values agree.

use crate::params::{render_value, ParamValue};
use regex::Regex;

/// What an actual scalar is compared against.
#[derive(Debug, Clone, Copy)]
pub enum Expected<'a> {
    /// Exact equality, including the scalar's type. `None` expects absence.
    Literal(Option<&'a ParamValue>),
    /// The pattern must match the rendered actual value.
    Pattern(&'a Regex),
}

/// Compare a single actual value to an expectation.
///
/// Returns the pattern source or the rendered literal when they disagree.
pub fn compare_single(actual: Option<&ParamValue>, expected: Expected<'_>) -> Vec<String> {
    match expected {
        Expected::Pattern(pattern) => {
            let matched = actual.is_some_and(|value| pattern.is_match(&value.to_string()));
            if matched {
                Vec::new()
            } else {
                vec![pattern.as_str().to_string()]
            }
        }
        Expected::Literal(comparison) => {
            if actual == comparison {
                Vec::new()
            } else {
                vec![render_value(comparison)]
            }
        }
    }
}

/// Compare an actual sequence against expected values.
///
/// An expected value is met when some actual element contains it literally.
/// Returns the expected values with no such element; every value is missing
/// when `actual` is absent.
pub fn compare_multi(actual: Option<&[String]>, expected: &[String]) -> Vec<String> {
    expected
        .iter()
        .filter(|value| {
            let found = actual.is_some_and(|actual| {
                actual
                    .iter()
                    .any(|actual_value| actual_value.contains(value.as_str()))
            });
            !found
        })
        .cloned()
        .collect()
}
