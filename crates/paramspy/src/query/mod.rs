//! Solr-style search queries and the builder DSL that produces them.
//!
//! A [`Query`] is a structured description of one search. Matchers never look
//! at its fields directly; they only consume the flat parameter map returned
//! by [`Query::to_params`].
//!
//! # Module Structure
//!
//! - `arg` - Positional assertion arguments and the `args!` macro
//! - `builder` - The `SearchBuilder` DSL used by recorded blocks

mod arg;
mod builder;

pub use arg::Arg;
pub use builder::SearchBuilder;

use crate::params::{keys, ParamValue, ParameterMap};
use serde::{Deserialize, Serialize};

/// Query text used when no keywords were given.
pub const MATCH_ALL: &str = "*:*";
/// Field searched when keywords name no fields.
pub const DEFAULT_TEXT_FIELD: &str = "text";
/// Parser selected for keyword searches.
pub const KEYWORD_PARSER: &str = "edismax";
pub const DEFAULT_PER_PAGE: i64 = 30;

/// A filter restriction (`fq` entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    /// Rendered Solr term, e.g. `1`, `(1 OR 2)` or `{5 TO *}`.
    pub term: String,
    /// `without` restrictions render with a leading `-`.
    #[serde(default)]
    pub negated: bool,
}

impl Filter {
    pub fn render(&self) -> String {
        let sign = if self.negated { "-" } else { "" };
        format!("{sign}{}:{}", self.field, self.term)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keywords {
    pub text: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// A boost query: documents matching `field:value` score `factor` higher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostQuery {
    pub field: String,
    pub value: String,
    pub factor: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub field: String,
    #[serde(default)]
    pub options: FacetOptions,
}

/// Sort direction of an `order_by` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Offset of the first row. Saturates instead of overflowing on huge pages.
    pub fn start(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }
}

/// One built search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Names of the document types searched.
    pub types: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Keywords>,
    /// Per-field boosts applied to keyword fields (`qf`).
    #[serde(default)]
    pub field_boosts: Vec<(String, f64)>,
    #[serde(default)]
    pub boost_queries: Vec<BoostQuery>,
    #[serde(default)]
    pub boost_functions: Vec<String>,
    #[serde(default)]
    pub facets: Vec<Facet>,
    #[serde(default)]
    pub sorts: Vec<Sort>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl Query {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Render the query as a Solr parameter map.
    pub fn to_params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();

        let mut filter_queries: Vec<String> = self.type_filter().into_iter().collect();
        filter_queries.extend(self.filters.iter().map(Filter::render));
        if !filter_queries.is_empty() {
            params.insert(keys::FILTER_QUERY.into(), ParamValue::List(filter_queries));
        }

        match &self.keywords {
            Some(keywords) => {
                params.insert(keys::QUERY.into(), ParamValue::text(&keywords.text));
                params.insert(keys::DEF_TYPE.into(), ParamValue::text(KEYWORD_PARSER));
                params.insert(
                    keys::QUERY_FIELDS.into(),
                    ParamValue::Text(self.query_fields(keywords)),
                );
            }
            None => {
                params.insert(keys::QUERY.into(), ParamValue::text(MATCH_ALL));
            }
        }

        if !self.boost_queries.is_empty() {
            let boosts = self
                .boost_queries
                .iter()
                .map(|b| format!("{}:{}^{:?}", b.field, b.value, b.factor));
            params.insert(keys::BOOST_QUERY.into(), ParamValue::list(boosts));
        }
        if !self.boost_functions.is_empty() {
            params.insert(
                keys::BOOST_FUNCTION.into(),
                ParamValue::list(self.boost_functions.iter().cloned()),
            );
        }

        if !self.facets.is_empty() {
            params.insert(keys::FACET.into(), ParamValue::text("true"));
            params.insert(
                keys::FACET_FIELD.into(),
                ParamValue::list(self.facets.iter().map(|f| f.field.clone())),
            );
            for facet in &self.facets {
                insert_facet_options(&mut params, facet);
            }
        }

        if !self.sorts.is_empty() {
            let clauses: Vec<String> = self
                .sorts
                .iter()
                .map(|s| format!("{} {}", s.field, s.direction.as_str()))
                .collect();
            params.insert(keys::SORT.into(), ParamValue::Text(clauses.join(", ")));
        }

        params.insert(
            keys::START.into(),
            ParamValue::Integer(self.pagination.start()),
        );
        params.insert(
            keys::ROWS.into(),
            ParamValue::Integer(self.pagination.per_page),
        );

        params
    }

    fn type_filter(&self) -> Option<String> {
        match self.types.as_slice() {
            [] => None,
            [single] => Some(format!("type:{single}")),
            many => Some(format!("type:({})", many.join(" OR "))),
        }
    }

    fn query_fields(&self, keywords: &Keywords) -> String {
        let mut fields: Vec<String> = if keywords.fields.is_empty() {
            vec![DEFAULT_TEXT_FIELD.to_string()]
        } else {
            keywords.fields.clone()
        };
        for (field, _) in &self.field_boosts {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }

        let rendered: Vec<String> = fields
            .iter()
            .map(|field| {
                match self.field_boosts.iter().find(|(name, _)| name == field) {
                    Some((_, factor)) => format!("{field}^{factor:?}"),
                    None => field.clone(),
                }
            })
            .collect();
        rendered.join(" ")
    }
}

fn insert_facet_options(params: &mut ParameterMap, facet: &Facet) {
    let key = |option: &str| format!("f.{}.facet.{option}", facet.field);
    let options = &facet.options;
    if let Some(limit) = options.limit {
        params.insert(key("limit"), ParamValue::Integer(limit));
    }
    if let Some(sort) = &options.sort {
        params.insert(key("sort"), ParamValue::text(sort));
    }
    if let Some(minimum_count) = options.minimum_count {
        params.insert(key("mincount"), ParamValue::Integer(minimum_count));
    }
    if let Some(prefix) = &options.prefix {
        params.insert(key("prefix"), ParamValue::text(prefix));
    }
}
