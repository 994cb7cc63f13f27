//! Operation types and the per-operation comparison table.
//!
//! Every assertion names one [`Operation`]. Its [`OperationSpec`] declares the
//! builder method replayed to produce the reference query, the parameter keys
//! compared, and the wildcard policy. The table is a single exhaustive
//! `match`, so adding a variant without a table entry does not compile.

use crate::error::{MatchError, Result};
use crate::params::keys;
use crate::query::{Arg, Direction, FacetOptions, SearchBuilder};
use crate::wildcard::WildcardPolicy;
use std::fmt;
use std::str::FromStr;

/// A category of search behavior that can be asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    With,
    Without,
    Keywords,
    Boost,
    Facet,
    OrderBy,
    Paginate,
}

/// Which parameter keys an operation compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySelection {
    Fixed(&'static [&'static str]),
    /// Every key of the reference parameters containing the substring.
    Containing(&'static str),
}

/// Replays positional arguments against the builder method of an operation.
pub type ReferenceBuilder = fn(&mut SearchBuilder, &[Arg]) -> Result<()>;

/// Static description of how one operation is compared.
#[derive(Clone, Copy)]
pub struct OperationSpec {
    pub search_method: &'static str,
    pub keys: KeySelection,
    pub wildcard: WildcardPolicy,
    pub build_reference: ReferenceBuilder,
}

impl fmt::Debug for OperationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationSpec")
            .field("search_method", &self.search_method)
            .field("keys", &self.keys)
            .field("wildcard", &self.wildcard)
            .finish_non_exhaustive()
    }
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::With,
        Operation::Without,
        Operation::Keywords,
        Operation::Boost,
        Operation::Facet,
        Operation::OrderBy,
        Operation::Paginate,
    ];

    pub fn search_method(&self) -> &'static str {
        self.spec().search_method
    }

    pub fn spec(&self) -> OperationSpec {
        match self {
            Operation::With => OperationSpec {
                search_method: "with",
                keys: KeySelection::Fixed(&[keys::FILTER_QUERY]),
                wildcard: WildcardPolicy::Exact,
                build_reference: build_with,
            },
            Operation::Without => OperationSpec {
                search_method: "without",
                keys: KeySelection::Fixed(&[keys::FILTER_QUERY]),
                wildcard: WildcardPolicy::Exact,
                build_reference: build_without,
            },
            Operation::Keywords => OperationSpec {
                search_method: "keywords",
                keys: KeySelection::Fixed(&[keys::QUERY, keys::QUERY_FIELDS]),
                wildcard: WildcardPolicy::AnyValue(&[keys::QUERY, keys::QUERY_FIELDS]),
                build_reference: build_keywords,
            },
            Operation::Boost => OperationSpec {
                search_method: "boost",
                keys: KeySelection::Fixed(&[
                    keys::QUERY_FIELDS,
                    keys::BOOST_QUERY,
                    keys::BOOST_FUNCTION,
                ]),
                wildcard: WildcardPolicy::Exact,
                build_reference: build_boost,
            },
            Operation::Facet => OperationSpec {
                search_method: "facet",
                keys: KeySelection::Containing("facet"),
                wildcard: WildcardPolicy::Exact,
                build_reference: build_facet,
            },
            Operation::OrderBy => OperationSpec {
                search_method: "order_by",
                keys: KeySelection::Fixed(&[keys::SORT]),
                wildcard: WildcardPolicy::SortDirection,
                build_reference: build_order_by,
            },
            Operation::Paginate => OperationSpec {
                search_method: "paginate",
                keys: KeySelection::Fixed(&[keys::ROWS, keys::START]),
                wildcard: WildcardPolicy::Exact,
                build_reference: build_paginate,
            },
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.search_method())
    }
}

impl FromStr for Operation {
    type Err = MatchError;

    fn from_str(symbol: &str) -> Result<Self> {
        resolve(symbol)
    }
}

/// Dispatch an operation symbol (`with`, `order_by`, ...) to its operation.
pub fn resolve(symbol: &str) -> Result<Operation> {
    let symbol = symbol.trim_start_matches(':');
    Operation::ALL
        .into_iter()
        .find(|op| op.search_method() == symbol)
        .ok_or_else(|| MatchError::UnsupportedOperation(symbol.to_string()))
}

// ===== Reference builders =====

/// Drop a trailing `ANY_PARAM` that follows other arguments; it selects
/// wildcard mode rather than naming a value.
fn without_trailing_wildcard(args: &[Arg]) -> &[Arg] {
    match args {
        [rest @ .., last] if !rest.is_empty() && last.is_any() => rest,
        _ => args,
    }
}

fn field_name(operation: &'static str, arg: Option<&Arg>) -> Result<String> {
    match arg {
        Some(Arg::Text(field)) => Ok(field.clone()),
        Some(Arg::Any) => Ok(Arg::Any.render()),
        Some(other) => Err(MatchError::invalid_args(
            operation,
            format!("expected a field name, got `{other}`"),
        )),
        None => Err(MatchError::invalid_args(operation, "missing field name")),
    }
}

fn restriction(operation: &'static str, args: &[Arg]) -> Result<(String, Arg)> {
    let field = field_name(operation, args.first())?;
    match args {
        [_, value] => Ok((field, value.clone())),
        [_] => Err(MatchError::invalid_args(operation, "missing value")),
        _ => Err(MatchError::invalid_args(
            operation,
            format!("expected a field and a value, got {} arguments", args.len()),
        )),
    }
}

fn build_with(search: &mut SearchBuilder, args: &[Arg]) -> Result<()> {
    let (field, value) = restriction("with", args)?;
    search.with(&field, value);
    Ok(())
}

fn build_without(search: &mut SearchBuilder, args: &[Arg]) -> Result<()> {
    let (field, value) = restriction("without", args)?;
    search.without(&field, value);
    Ok(())
}

fn build_keywords(search: &mut SearchBuilder, args: &[Arg]) -> Result<()> {
    let args = without_trailing_wildcard(args);
    let text = args
        .first()
        .map(Arg::render)
        .ok_or_else(|| MatchError::invalid_args("keywords", "missing keyword text"))?;

    let fields = match args.get(1) {
        None => None,
        Some(Arg::List(fields)) => Some(fields.clone()),
        Some(Arg::Options(options)) => match options.get("fields") {
            Some(Arg::List(fields)) => Some(fields.clone()),
            Some(field) => Some(vec![field.clone()]),
            None => None,
        },
        Some(other) => {
            return Err(MatchError::invalid_args(
                "keywords",
                format!("expected fields, got `{other}`"),
            ))
        }
    };

    match fields {
        Some(fields) => search.keywords_in(text, fields.iter().map(Arg::render)),
        None => search.keywords(text),
    };
    Ok(())
}

fn build_boost(search: &mut SearchBuilder, args: &[Arg]) -> Result<()> {
    match without_trailing_wildcard(args) {
        [factor, field, value] => {
            let factor = factor.as_number().ok_or_else(|| {
                MatchError::invalid_args("boost", format!("expected a boost factor, got `{factor}`"))
            })?;
            let field = field_name("boost", Some(field))?;
            search.boost_query(&field, value.clone(), factor);
        }
        [Arg::Text(function)] => {
            search.boost_function(function.clone());
        }
        [Arg::Options(fields)] => {
            let mut boosts = Vec::with_capacity(fields.len());
            for (field, factor) in fields {
                let factor = factor.as_number().ok_or_else(|| {
                    MatchError::invalid_args(
                        "boost",
                        format!("expected a boost factor for `{field}`, got `{factor}`"),
                    )
                })?;
                boosts.push((field.clone(), factor));
            }
            search.boost_fields(boosts);
        }
        other => {
            return Err(MatchError::invalid_args(
                "boost",
                format!(
                    "expected (factor, field, value), a function, or field boosts; got {} arguments",
                    other.len()
                ),
            ))
        }
    }
    Ok(())
}

fn build_facet(search: &mut SearchBuilder, args: &[Arg]) -> Result<()> {
    let mut fields = Vec::new();
    let mut options = FacetOptions::default();
    for arg in args {
        match arg {
            Arg::Text(field) => fields.push(field.clone()),
            Arg::Any => {}
            Arg::Options(map) => options = facet_options(map)?,
            other => {
                return Err(MatchError::invalid_args(
                    "facet",
                    format!("expected a field name or options, got `{other}`"),
                ))
            }
        }
    }
    if fields.is_empty() {
        return Err(MatchError::invalid_args("facet", "missing field name"));
    }
    for field in &fields {
        search.facet_with(field, options.clone());
    }
    Ok(())
}

fn facet_options(map: &std::collections::BTreeMap<String, Arg>) -> Result<FacetOptions> {
    let integer = |key: &str| -> Result<Option<i64>> {
        match map.get(key) {
            None => Ok(None),
            Some(value) => value.as_integer().map(Some).ok_or_else(|| {
                MatchError::invalid_args("facet", format!("`{key}` must be an integer"))
            }),
        }
    };
    Ok(FacetOptions {
        limit: integer("limit")?,
        sort: map.get("sort").map(Arg::render),
        minimum_count: integer("minimum_count")?,
        prefix: map.get("prefix").map(Arg::render),
    })
}

fn build_order_by(search: &mut SearchBuilder, args: &[Arg]) -> Result<()> {
    let args = without_trailing_wildcard(args);
    let field = field_name("order_by", args.first())?;
    let direction = match args.get(1) {
        None => Direction::Asc,
        Some(arg) => {
            let direction = arg.as_text().ok_or_else(|| {
                MatchError::invalid_args("order_by", format!("expected a direction, got `{arg}`"))
            })?;
            Direction::parse(direction).ok_or_else(|| {
                MatchError::invalid_args("order_by", format!("unknown direction `{direction}`"))
            })?
        }
    };
    if args.len() > 2 {
        return Err(MatchError::invalid_args(
            "order_by",
            "expected a field and an optional direction",
        ));
    }
    search.order_by(&field, direction);
    Ok(())
}

fn build_paginate(search: &mut SearchBuilder, args: &[Arg]) -> Result<()> {
    let options = match without_trailing_wildcard(args) {
        [single] => single.as_options(),
        _ => None,
    }
    .ok_or_else(|| {
        MatchError::invalid_args("paginate", "expected options with `page` and/or `per_page`")
    })?;
    let integer = |key: &str, default: i64| -> Result<i64> {
        match options.get(key) {
            None => Ok(default),
            Some(value) => value.as_integer().ok_or_else(|| {
                MatchError::invalid_args("paginate", format!("`{key}` must be an integer"))
            }),
        }
    };
    let page = integer("page", 1)?;
    let per_page = integer("per_page", crate::query::DEFAULT_PER_PAGE)?;
    search.paginate(page, per_page);
    Ok(())
}
