//! Test assertions for Solr-style search parameters.
//!
//! Code under test issues searches against a [`RecordingSession`] instead of
//! a live search client. Assertions then compare the parameters of the most
//! recent search with a reference query built from the expected arguments.
//!
//! # Example
//!
//! ```
//! use paramspy::query::Direction;
//! use paramspy::{args, assertions::*, Operation, RecordingSession, ANY_PARAM};
//!
//! let mut session = RecordingSession::new();
//! session.search(["Post"], |s| {
//!     s.keywords_in("great pizza", ["title"])
//!         .with("blog_id", 4)
//!         .order_by("created_at", Direction::Desc);
//! });
//!
//! assert_is_search_for(&session, "Post");
//! assert_has_search_params(&session, Operation::Keywords, args!["title", ANY_PARAM]);
//! assert_has_search_params(&session, Operation::OrderBy, args!["created_at", ANY_PARAM]);
//! assert_has_no_search_params(&session, Operation::With, args!["blog_id", 5]);
//! ```

pub mod assertions;
pub mod comparator;
pub mod error;
pub mod matcher;
pub mod membership;
pub mod operation;
pub mod params;
pub mod query;
pub mod session;
pub mod wildcard;

// Re-export the types most assertions need
pub use assertions::{
    assert_has_no_search_params, assert_has_search_params, assert_is_not_search_for,
    assert_is_search_for, check_has_no_search_params, check_has_search_params,
    check_is_not_search_for, check_is_search_for,
};
pub use error::{MatchError, Result};
pub use matcher::{Differences, Expectation, ParamsMatcher};
pub use membership::SearchForMatcher;
pub use operation::Operation;
pub use params::{extract_params, ParamValue, ParameterMap};
pub use query::{Arg, Query, SearchBuilder};
pub use session::{build_search, RecordedOperation, RecordingSession, SearchSource};
pub use wildcard::ANY_PARAM;
