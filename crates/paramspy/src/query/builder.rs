//! Builder DSL for recorded searches.

use super::arg::Arg;
use super::{BoostQuery, Direction, Facet, FacetOptions, Filter, Keywords, Pagination, Query};
use crate::error::Result;
use crate::operation::Operation;
use std::collections::BTreeMap;

/// DSL invoked inside a recorded search block.
///
/// ```
/// use paramspy::query::{Direction, SearchBuilder};
///
/// let mut search = SearchBuilder::new(["Post"]);
/// search
///     .keywords("great pizza")
///     .with("category_ids", [1, 2])
///     .order_by("created_at", Direction::Desc)
///     .paginate(2, 15);
/// let params = search.build().to_params();
/// assert_eq!(params["sort"].to_string(), "created_at desc");
/// ```
#[derive(Debug, Clone)]
pub struct SearchBuilder {
    query: Query,
}

impl SearchBuilder {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            query: Query::new(types),
        }
    }

    /// Restrict results to documents where `field` matches `value`.
    ///
    /// A list value adds one restriction per element, so every element must
    /// match. An option map renders a range or disjunction:
    /// `greater_than`, `less_than`, `between: [low, high]`, `any_of: [..]`.
    pub fn with(&mut self, field: &str, value: impl Into<Arg>) -> &mut Self {
        self.restrict(field, &value.into(), false)
    }

    /// Exclude documents where `field` matches `value`.
    pub fn without(&mut self, field: &str, value: impl Into<Arg>) -> &mut Self {
        self.restrict(field, &value.into(), true)
    }

    pub fn keywords(&mut self, text: impl Into<String>) -> &mut Self {
        self.query.keywords = Some(Keywords {
            text: text.into(),
            fields: Vec::new(),
        });
        self
    }

    /// Keyword search restricted to the given text fields.
    pub fn keywords_in<I, S>(&mut self, text: impl Into<String>, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.keywords = Some(Keywords {
            text: text.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn boost_fields<I, S>(&mut self, boosts: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        for (field, factor) in boosts {
            let field = field.into();
            self.query.field_boosts.retain(|(name, _)| *name != field);
            self.query.field_boosts.push((field, factor));
        }
        self
    }

    pub fn boost_query(&mut self, field: &str, value: impl Into<Arg>, factor: f64) -> &mut Self {
        self.query.boost_queries.push(BoostQuery {
            field: field.to_string(),
            value: value.into().render(),
            factor,
        });
        self
    }

    pub fn boost_function(&mut self, function: impl Into<String>) -> &mut Self {
        self.query.boost_functions.push(function.into());
        self
    }

    pub fn facet(&mut self, field: &str) -> &mut Self {
        self.facet_with(field, FacetOptions::default())
    }

    pub fn facet_with(&mut self, field: &str, options: FacetOptions) -> &mut Self {
        self.query.facets.push(Facet {
            field: field.to_string(),
            options,
        });
        self
    }

    pub fn order_by(&mut self, field: &str, direction: Direction) -> &mut Self {
        self.query.sorts.push(super::Sort {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn paginate(&mut self, page: i64, per_page: i64) -> &mut Self {
        self.query.pagination = Pagination { page, per_page };
        self
    }

    /// Replay positional assertion arguments against the builder method
    /// named by `operation`.
    pub fn apply(&mut self, operation: Operation, args: &[Arg]) -> Result<&mut Self> {
        (operation.spec().build_reference)(self, args)?;
        Ok(self)
    }

    /// The query built so far.
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn build(self) -> Query {
        self.query
    }

    fn restrict(&mut self, field: &str, value: &Arg, negated: bool) -> &mut Self {
        for term in filter_terms(value) {
            self.query.filters.push(Filter {
                field: field.to_string(),
                term,
                negated,
            });
        }
        self
    }
}

fn filter_terms(value: &Arg) -> Vec<String> {
    match value {
        Arg::List(values) => values.iter().map(Arg::render).collect(),
        Arg::Options(options) => vec![options_term(options)],
        other => vec![other.render()],
    }
}

fn options_term(options: &BTreeMap<String, Arg>) -> String {
    if let Some([low, high]) = options.get("between").and_then(Arg::as_list) {
        return format!("[{} TO {}]", low.render(), high.render());
    }
    if let Some(any_of) = options.get("any_of") {
        return any_of.render();
    }

    let lower = options.get("greater_than").map(Arg::render);
    let upper = options.get("less_than").map(Arg::render);
    if lower.is_some() || upper.is_some() {
        return format!(
            "{{{} TO {}}}",
            lower.as_deref().unwrap_or("*"),
            upper.as_deref().unwrap_or("*")
        );
    }

    Arg::Options(options.clone()).render()
}
