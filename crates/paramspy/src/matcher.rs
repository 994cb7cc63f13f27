//! Search parameter matcher.
//!
//! A [`ParamsMatcher`] compares the most recent recorded search against a
//! reference query built from the assertion's expected arguments:
//!
//! 1. Resolve the actual search from the session (or a single recording).
//! 2. Build the reference query for the same document types, either by
//!    replaying the positional arguments against the operation's builder
//!    method or by running a caller-supplied block.
//! 3. Extract both parameter maps (lazily, once per matcher).
//! 4. Compare every key the operation declares and collect the unmet values.

use crate::comparator::{compare_multi, compare_single, Expected};
use crate::error::Result;
use crate::operation::{resolve, KeySelection, Operation, OperationSpec};
use crate::params::{extract_params, keys, render_list, render_value, ParamValue, ParameterMap};
use crate::query::{Arg, Query, SearchBuilder};
use crate::session::{build_search, try_build_search, RecordedOperation, SearchSource};
use crate::wildcard::{
    field_pattern, filter_values, is_wildcard, sentinel_pattern, with_direction_wildcard,
    WildcardPolicy, ANY_PARAM, ANY_VALUE, PLACEHOLDER_DIRECTION,
};
use once_cell::unsync::OnceCell;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Block that builds the reference search when positional arguments cannot
/// express the expected shape.
pub type SearchBlock<'a> = Box<dyn Fn(&mut SearchBuilder) + 'a>;

/// Expected arguments of one assertion.
pub struct Expectation<'a> {
    args: Vec<Arg>,
    block: Option<SearchBlock<'a>>,
}

impl<'a> Expectation<'a> {
    pub fn new(args: Vec<Arg>) -> Self {
        Self { args, block: None }
    }

    /// Expect whatever `block` builds.
    pub fn block<F>(block: F) -> Self
    where
        F: Fn(&mut SearchBuilder) + 'a,
    {
        Self::new(Vec::new()).with_block(block)
    }

    /// Attach a block; positional arguments are then only used for the field name.
    pub fn with_block<F>(mut self, block: F) -> Self
    where
        F: Fn(&mut SearchBuilder) + 'a,
    {
        self.block = Some(Box::new(block));
        self
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn has_block(&self) -> bool {
        self.block.is_some()
    }

    /// Wildcard mode: the last positional argument is `ANY_PARAM` and no
    /// block was given.
    pub fn is_wildcard(&self) -> bool {
        self.block.is_none() && is_wildcard(&self.args)
    }
}

impl From<Vec<Arg>> for Expectation<'_> {
    fn from(args: Vec<Arg>) -> Self {
        Expectation::new(args)
    }
}

impl fmt::Debug for Expectation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("args", &self.args)
            .field("block", &self.block.is_some())
            .finish()
    }
}

/// Keys that differ between the actual and reference parameters, in
/// comparison order, with the expected values that were not met.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Differences {
    entries: Vec<(String, Vec<String>)>,
}

impl Differences {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, missing)| missing.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, missing)| (k.as_str(), missing.as_slice()))
    }
}

enum Reference {
    Query {
        query: Query,
        /// Rewrite the placeholder sort direction into the sentinel.
        direction_wildcard: bool,
    },
    Params(ParameterMap),
}

/// Compares one recorded search against the parameters an operation expects.
pub struct ParamsMatcher<'s> {
    operation: Operation,
    spec: OperationSpec,
    args: Vec<Arg>,
    wildcard: bool,
    search: &'s RecordedOperation,
    reference: Reference,
    actual_params: OnceCell<ParameterMap>,
    comparison_params: OnceCell<ParameterMap>,
    wildcard_matchers: OnceCell<BTreeMap<String, Regex>>,
}

impl<'s> ParamsMatcher<'s> {
    /// Build a matcher for `operation`.
    ///
    /// Fails with `NoSearchFound` when the source holds no recording, and
    /// with `InvalidArguments` when the positional arguments do not fit the
    /// operation's builder method.
    pub fn new<'a, S>(
        source: &'s S,
        operation: Operation,
        expectation: impl Into<Expectation<'a>>,
    ) -> Result<Self>
    where
        S: SearchSource + ?Sized,
    {
        let expectation = expectation.into();
        let search = source.resolve()?;
        let spec = operation.spec();
        let wildcard = expectation.is_wildcard();
        let reference = build_reference(operation, &spec, search, &expectation)?;

        Ok(Self {
            operation,
            spec,
            args: expectation.args,
            wildcard,
            search,
            reference,
            actual_params: OnceCell::new(),
            comparison_params: OnceCell::new(),
            wildcard_matchers: OnceCell::new(),
        })
    }

    /// Build a matcher from an operation symbol such as `"with"` or `"order_by"`.
    pub fn from_symbol<'a, S>(
        source: &'s S,
        symbol: &str,
        expectation: impl Into<Expectation<'a>>,
    ) -> Result<Self>
    where
        S: SearchSource + ?Sized,
    {
        let operation = resolve(symbol)?;
        Self::new(source, operation, expectation)
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn search(&self) -> &'s RecordedOperation {
        self.search
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// The asserted field name: the first positional argument.
    pub fn field(&self) -> Option<String> {
        self.args.first().map(Arg::render)
    }

    /// The reference query, absent for a field-wildcard `order_by`.
    pub fn reference_query(&self) -> Option<&Query> {
        match &self.reference {
            Reference::Query { query, .. } => Some(query),
            Reference::Params(_) => None,
        }
    }

    pub fn actual_params(&self) -> &ParameterMap {
        self.actual_params
            .get_or_init(|| extract_params(self.search.query()))
    }

    pub fn comparison_params(&self) -> &ParameterMap {
        self.comparison_params
            .get_or_init(|| match &self.reference {
                Reference::Query {
                    query,
                    direction_wildcard: true,
                } => with_direction_wildcard(&extract_params(query)),
                Reference::Query { query, .. } => extract_params(query),
                Reference::Params(params) => params.clone(),
            })
    }

    /// Keys compared by this operation, in comparison order.
    pub fn keys_to_compare(&self) -> Vec<String> {
        match self.spec.keys {
            KeySelection::Fixed(keys) => keys.iter().map(|k| k.to_string()).collect(),
            KeySelection::Containing(needle) => self
                .comparison_params()
                .keys()
                .filter(|key| key.contains(needle))
                .cloned()
                .collect(),
        }
    }

    pub fn matches(&self) -> bool {
        self.differences().is_empty()
    }

    pub fn differences(&self) -> Differences {
        let entries: Vec<(String, Vec<String>)> = self
            .keys_to_compare()
            .into_iter()
            .filter_map(|key| {
                let missing = self.compare_key(&key);
                (!missing.is_empty()).then_some((key, missing))
            })
            .collect();

        if !entries.is_empty() {
            debug!(
                "`{}` search params differ on {} key(s): {:?}",
                self.operation,
                entries.len(),
                entries.iter().map(|(k, _)| k).collect::<Vec<_>>()
            );
        }
        Differences { entries }
    }

    /// Diagnostic for an assertion that expected a match.
    pub fn missing_param_error_message(&self) -> String {
        let differences = self.differences();
        let actual_values: Vec<String> = differences
            .keys()
            .map(|key| format!("{key} => {}", render_value(self.actual_params().get(key))))
            .collect();
        let missing_values: Vec<String> = differences
            .iter()
            .map(|(key, missing)| format!("{key} => {}", render_list(missing)))
            .collect();
        format!(
            "expected search params: {} to match expected: {}",
            actual_values.join(" and "),
            missing_values.join(" and ")
        )
    }

    /// Diagnostic for an assertion that expected no match.
    pub fn unexpected_match_error_message(&self) -> String {
        let keys = self.keys_to_compare();
        let render = |params: &ParameterMap| -> Vec<String> {
            keys.iter()
                .map(|key| format!("{key} => {}", render_value(params.get(key))))
                .collect()
        };
        format!(
            "expected search params: {} NOT to match expected: {}",
            render(self.actual_params()).join(" and "),
            render(self.comparison_params()).join(" and ")
        )
    }

    fn compare_key(&self, key: &str) -> Vec<String> {
        let actual = self.actual_params().get(key);
        let comparison = self.comparison_params().get(key);

        if actual.is_some_and(ParamValue::is_list) || comparison.is_some_and(ParamValue::is_list) {
            let actual_values = actual.map(ParamValue::to_values);
            let expected = comparison.map(ParamValue::to_values).unwrap_or_default();
            return compare_multi(actual_values.as_deref(), &self.filter_values(expected));
        }

        let pattern = if self.wildcard {
            self.wildcard_matcher(key)
        } else {
            None
        };
        match pattern {
            Some(pattern) => compare_single(actual, Expected::Pattern(pattern)),
            None => compare_single(actual, Expected::Literal(comparison)),
        }
    }

    fn filter_values(&self, values: Vec<String>) -> Vec<String> {
        match (self.wildcard, self.field()) {
            (true, Some(field)) => filter_values(values, &field_pattern(&field)),
            _ => values,
        }
    }

    fn wildcard_matcher(&self, key: &str) -> Option<&Regex> {
        self.wildcard_matchers
            .get_or_init(|| self.build_wildcard_matchers())
            .get(key)
    }

    fn build_wildcard_matchers(&self) -> BTreeMap<String, Regex> {
        let mut matchers = BTreeMap::new();
        match self.spec.wildcard {
            WildcardPolicy::Exact => {}
            WildcardPolicy::AnyValue(keys) => {
                for key in keys {
                    matchers.insert(key.to_string(), ANY_VALUE.clone());
                }
            }
            WildcardPolicy::SortDirection => {
                if is_field_wildcard(&self.args) {
                    matchers.insert(keys::SORT.to_string(), ANY_VALUE.clone());
                } else if let Some(ParamValue::Text(sort)) = self.comparison_params().get(keys::SORT)
                {
                    matchers.insert(keys::SORT.to_string(), sentinel_pattern(sort));
                }
            }
        }
        matchers
    }
}

impl fmt::Debug for ParamsMatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamsMatcher")
            .field("operation", &self.operation)
            .field("args", &self.args)
            .field("wildcard", &self.wildcard)
            .finish_non_exhaustive()
    }
}

/// `order_by(ANY_PARAM)`: any sort value is accepted.
fn is_field_wildcard(args: &[Arg]) -> bool {
    args.first().is_some_and(Arg::is_any)
}

/// `order_by(field, ANY_PARAM)`: the field is pinned, the direction is not.
fn is_direction_wildcard(args: &[Arg]) -> bool {
    args.len() == 2 && is_wildcard(args)
}

fn build_reference(
    operation: Operation,
    spec: &OperationSpec,
    search: &RecordedOperation,
    expectation: &Expectation<'_>,
) -> Result<Reference> {
    let args = expectation.args();

    if operation == Operation::OrderBy && is_field_wildcard(args) {
        let mut params = ParameterMap::new();
        params.insert(keys::SORT.to_string(), ParamValue::text(ANY_PARAM));
        return Ok(Reference::Params(params));
    }

    if let Some(block) = &expectation.block {
        let query = build_search(search.types(), |builder| block(builder));
        return Ok(Reference::Query {
            query,
            direction_wildcard: false,
        });
    }

    if operation == Operation::OrderBy && is_direction_wildcard(args) {
        let replay = vec![args[0].clone(), Arg::from(PLACEHOLDER_DIRECTION)];
        let query = try_build_search(search.types(), |builder| {
            (spec.build_reference)(builder, &replay)
        })?;
        return Ok(Reference::Query {
            query,
            direction_wildcard: true,
        });
    }

    let query = try_build_search(search.types(), |builder| (spec.build_reference)(builder, args))?;
    Ok(Reference::Query {
        query,
        direction_wildcard: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::error::MatchError;
    use crate::query::Direction;
    use crate::session::RecordingSession;
    use tracing_test::traced_test;

    fn session_with<F>(block: F) -> RecordingSession
    where
        F: FnOnce(&mut SearchBuilder),
    {
        let mut session = RecordingSession::new();
        session.search(["Post"], block);
        session
    }

    #[test]
    fn test_with_matches_same_arguments() {
        let session = session_with(|s| {
            s.with("category_ids", [1, 2]);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::With, args!["category_ids", [1, 2]]).unwrap();
        assert!(matcher.matches());
        assert!(matcher.differences().is_empty());
    }

    #[test]
    fn test_with_reports_missing_filter() {
        let session = session_with(|s| {
            s.with("category_ids", 1);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::With, args!["category_ids", [1, 2]]).unwrap();

        let differences = matcher.differences();
        assert!(!matcher.matches());
        assert_eq!(differences.get("fq"), Some(&["category_ids:2".to_string()][..]));
    }

    #[test]
    #[traced_test]
    fn test_differences_are_logged() {
        let session = session_with(|s| {
            s.with("blog_id", 4);
        });
        let matcher = ParamsMatcher::new(&session, Operation::With, args!["blog_id", 5]).unwrap();
        assert!(!matcher.matches());
        assert!(logs_contain("`with` search params differ on 1 key(s)"));
    }

    #[test]
    fn test_with_wildcard_value() {
        let session = session_with(|s| {
            s.with("category_ids", 7).with("blog_id", 2);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::With, args!["category_ids", ANY_PARAM])
                .unwrap();
        assert!(matcher.is_wildcard());
        assert!(matcher.matches());

        let session = session_with(|s| {
            s.with("blog_id", 2);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::With, args!["category_ids", ANY_PARAM])
                .unwrap();
        assert_eq!(
            matcher.differences().get("fq"),
            Some(&["category_ids".to_string()][..])
        );
    }

    #[test]
    fn test_without_distinguished_from_with() {
        let session = session_with(|s| {
            s.with("blog_id", 4);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::Without, args!["blog_id", 4]).unwrap();
        assert!(!matcher.matches());
    }

    #[test]
    fn test_without_wildcard_value() {
        let session = session_with(|s| {
            s.without("published", false).with("blog_id", 2);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::Without, args!["published", ANY_PARAM])
                .unwrap();
        assert!(matcher.is_wildcard());
        assert!(matcher.matches());

        // a positive filter on the same field does not satisfy the negated one
        let session = session_with(|s| {
            s.with("published", true);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::Without, args!["published", ANY_PARAM])
                .unwrap();
        assert!(!matcher.matches());
        assert_eq!(
            matcher.differences().get("fq"),
            Some(&["-published".to_string()][..])
        );
    }

    #[test]
    fn test_keywords_literal_and_wildcard() {
        let session = session_with(|s| {
            s.keywords_in("great pizza", ["name"]);
        });

        let literal = ParamsMatcher::new(
            &session,
            Operation::Keywords,
            args!["great pizza", Arg::options([("fields", Arg::from(["name"]))])],
        )
        .unwrap();
        assert!(literal.matches());

        let wildcard =
            ParamsMatcher::new(&session, Operation::Keywords, args!["name", ANY_PARAM]).unwrap();
        assert!(wildcard.matches());

        let wrong = ParamsMatcher::new(&session, Operation::Keywords, args!["pasta"]).unwrap();
        let differences = wrong.differences();
        assert!(differences.contains_key("q"));
        assert!(differences.contains_key("qf"));
    }

    #[test]
    fn test_keywords_wildcard_requires_a_keyword_search() {
        let session = session_with(|s| {
            s.with("blog_id", 4);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::Keywords, args!["name", ANY_PARAM]).unwrap();
        let differences = matcher.differences();
        assert_eq!(differences.get("qf"), Some(&[".".to_string()][..]));
    }

    #[test]
    fn test_boost_compares_boost_keys() {
        let session = session_with(|s| {
            s.boost_query("featured", true, 2.0);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::Boost, args![2.0, "featured", true]).unwrap();
        assert!(matcher.matches());

        let matcher =
            ParamsMatcher::new(&session, Operation::Boost, args![3.0, "featured", true]).unwrap();
        assert_eq!(
            matcher.differences().get("bq"),
            Some(&["featured:true^3.0".to_string()][..])
        );
    }

    #[test]
    fn test_facet_keys_come_from_reference() {
        let session = session_with(|s| {
            s.facet("category_ids").facet_with(
                "blog_id",
                crate::query::FacetOptions {
                    limit: Some(5),
                    ..Default::default()
                },
            );
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::Facet, args!["category_ids"]).unwrap();
        assert_eq!(matcher.keys_to_compare(), vec!["facet", "facet.field"]);
        assert!(matcher.matches());

        let matcher = ParamsMatcher::new(
            &session,
            Operation::Facet,
            args!["category_ids", Arg::options([("limit", 10)])],
        )
        .unwrap();
        assert_eq!(
            matcher.keys_to_compare(),
            vec!["f.category_ids.facet.limit", "facet", "facet.field"]
        );
        assert!(matcher
            .differences()
            .contains_key("f.category_ids.facet.limit"));
    }

    #[test]
    fn test_order_by_wildcards() {
        let desc = session_with(|s| {
            s.order_by("created_at", Direction::Desc);
        });
        let asc = session_with(|s| {
            s.order_by("created_at", Direction::Asc);
        });
        let title = session_with(|s| {
            s.order_by("title", Direction::Asc);
        });
        let unsorted = session_with(|_| {});

        let direction = args!["created_at", ANY_PARAM];
        assert!(ParamsMatcher::new(&desc, Operation::OrderBy, direction.clone()).unwrap().matches());
        assert!(ParamsMatcher::new(&asc, Operation::OrderBy, direction.clone()).unwrap().matches());
        assert!(!ParamsMatcher::new(&title, Operation::OrderBy, direction).unwrap().matches());

        let field = args![ANY_PARAM];
        let matcher = ParamsMatcher::new(&title, Operation::OrderBy, field.clone()).unwrap();
        assert!(matcher.reference_query().is_none());
        assert!(matcher.matches());
        assert!(!ParamsMatcher::new(&unsorted, Operation::OrderBy, field).unwrap().matches());
    }

    #[test]
    fn test_order_by_direction_wildcard_comparison_params() {
        let session = session_with(|s| {
            s.order_by("created_at", Direction::Desc);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::OrderBy, args!["created_at", ANY_PARAM])
                .unwrap();
        assert_eq!(
            matcher.comparison_params()["sort"],
            ParamValue::text("created_at ANY_PARAM")
        );
        let reference = matcher.reference_query().unwrap().to_params();
        assert_eq!(reference["sort"], ParamValue::text("created_at asc"));
    }

    #[test]
    fn test_order_by_literal() {
        let session = session_with(|s| {
            s.order_by("created_at", Direction::Desc);
        });
        let matcher =
            ParamsMatcher::new(&session, Operation::OrderBy, args!["created_at", "asc"]).unwrap();
        assert_eq!(
            matcher.differences().get("sort"),
            Some(&["created_at asc".to_string()][..])
        );
    }

    #[test]
    fn test_paginate_compares_integers() {
        let session = session_with(|s| {
            s.paginate(2, 15);
        });
        let matcher = ParamsMatcher::new(
            &session,
            Operation::Paginate,
            args![Arg::options([("page", 2), ("per_page", 15)])],
        )
        .unwrap();
        assert!(matcher.matches());

        let matcher = ParamsMatcher::new(
            &session,
            Operation::Paginate,
            args![Arg::options([("page", 3), ("per_page", 15)])],
        )
        .unwrap();
        let differences = matcher.differences();
        assert_eq!(differences.keys().collect::<Vec<_>>(), vec!["start"]);
        assert_eq!(differences.get("start"), Some(&["30".to_string()][..]));
    }

    #[test]
    fn test_block_expectation() {
        let session = session_with(|s| {
            s.with("price", Arg::options([("greater_than", 5)]));
        });
        let matcher = ParamsMatcher::new(
            &session,
            Operation::With,
            Expectation::block(|s| {
                s.with("price", Arg::options([("greater_than", 5)]));
            }),
        )
        .unwrap();
        assert!(matcher.matches());
    }

    #[test]
    fn test_block_disables_wildcard() {
        let expectation = Expectation::new(args!["category_ids", ANY_PARAM]).with_block(|_| {});
        assert!(expectation.has_block());
        assert!(!expectation.is_wildcard());
    }

    #[test]
    fn test_recorded_operation_as_source() {
        let session = session_with(|s| {
            s.with("blog_id", 4);
        });
        let recorded = session.searches()[0].clone();
        let matcher = ParamsMatcher::new(&recorded, Operation::With, args!["blog_id", 4]).unwrap();
        assert!(matcher.matches());
    }

    #[test]
    fn test_no_search_found() {
        let session = RecordingSession::new();
        let err = ParamsMatcher::new(&session, Operation::With, args!["blog_id", 4]).unwrap_err();
        assert!(matches!(err, MatchError::NoSearchFound));
    }

    #[test]
    fn test_from_symbol_unsupported() {
        let session = session_with(|_| {});
        let err = ParamsMatcher::from_symbol(&session, "highlight", args!["title"]).unwrap_err();
        assert!(matches!(err, MatchError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_messages() {
        let session = session_with(|s| {
            s.keywords_in("pizza", ["name"]);
        });
        let matcher = ParamsMatcher::new(&session, Operation::Keywords, args!["pasta"]).unwrap();
        assert_eq!(
            matcher.missing_param_error_message(),
            r#"expected search params: q => pizza and qf => name to match expected: q => ["pasta"] and qf => ["text"]"#
        );

        let matcher = ParamsMatcher::new(
            &session,
            Operation::Keywords,
            args!["pizza", Arg::from(["name"])],
        )
        .unwrap();
        assert_eq!(
            matcher.unexpected_match_error_message(),
            "expected search params: q => pizza and qf => name NOT to match expected: q => pizza and qf => name"
        );
    }

    #[test]
    fn test_params_are_memoized() {
        let session = session_with(|s| {
            s.with("blog_id", 4);
        });
        let matcher = ParamsMatcher::new(&session, Operation::With, args!["blog_id", 4]).unwrap();
        let first: *const ParameterMap = matcher.actual_params();
        let second: *const ParameterMap = matcher.actual_params();
        assert_eq!(first, second);
    }
}
