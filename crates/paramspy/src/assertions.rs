//! Assertion entry points.
//!
//! The `check_*` functions return [`MatchError::AssertionFailed`] with the
//! diagnostic message when the expectation does not hold, so any harness can
//! report it. The `assert_*` functions panic with the same message and are
//! meant to be called directly from `#[test]` functions.

use crate::error::{MatchError, Result};
use crate::matcher::{Expectation, ParamsMatcher};
use crate::membership::SearchForMatcher;
use crate::operation::Operation;
use crate::session::SearchSource;

/// Succeeds when the latest search was built with the expected parameters.
pub fn check_has_search_params<'a, S>(
    source: &S,
    operation: Operation,
    expectation: impl Into<Expectation<'a>>,
) -> Result<()>
where
    S: SearchSource + ?Sized,
{
    let matcher = ParamsMatcher::new(source, operation, expectation)?;
    if matcher.matches() {
        Ok(())
    } else {
        Err(MatchError::AssertionFailed(
            matcher.missing_param_error_message(),
        ))
    }
}

/// Succeeds when the latest search does NOT carry the expected parameters.
pub fn check_has_no_search_params<'a, S>(
    source: &S,
    operation: Operation,
    expectation: impl Into<Expectation<'a>>,
) -> Result<()>
where
    S: SearchSource + ?Sized,
{
    let matcher = ParamsMatcher::new(source, operation, expectation)?;
    if matcher.matches() {
        Err(MatchError::AssertionFailed(
            matcher.unexpected_match_error_message(),
        ))
    } else {
        Ok(())
    }
}

/// Succeeds when `expected` is one of the latest search's types.
pub fn check_is_search_for<S>(source: &S, expected: &str) -> Result<()>
where
    S: SearchSource + ?Sized,
{
    let matcher = SearchForMatcher::new(source, expected)?;
    if matcher.matches() {
        Ok(())
    } else {
        Err(MatchError::AssertionFailed(
            matcher.missing_type_error_message(),
        ))
    }
}

pub fn check_is_not_search_for<S>(source: &S, expected: &str) -> Result<()>
where
    S: SearchSource + ?Sized,
{
    let matcher = SearchForMatcher::new(source, expected)?;
    if matcher.matches() {
        Err(MatchError::AssertionFailed(
            matcher.unexpected_type_error_message(),
        ))
    } else {
        Ok(())
    }
}

/// Panics unless the latest search was built with the expected parameters.
///
/// ```
/// use paramspy::{args, assert_has_search_params, Operation, RecordingSession};
///
/// let mut session = RecordingSession::new();
/// session.search(["Post"], |s| {
///     s.with("category_ids", [1, 2]).keywords("pizza");
/// });
///
/// assert_has_search_params(&session, Operation::With, args!["category_ids", [2, 1]]);
/// assert_has_search_params(&session, Operation::Keywords, args!["pizza"]);
/// ```
#[track_caller]
pub fn assert_has_search_params<'a, S>(
    source: &S,
    operation: Operation,
    expectation: impl Into<Expectation<'a>>,
) where
    S: SearchSource + ?Sized,
{
    if let Err(err) = check_has_search_params(source, operation, expectation) {
        panic!("{err}");
    }
}

#[track_caller]
pub fn assert_has_no_search_params<'a, S>(
    source: &S,
    operation: Operation,
    expectation: impl Into<Expectation<'a>>,
) where
    S: SearchSource + ?Sized,
{
    if let Err(err) = check_has_no_search_params(source, operation, expectation) {
        panic!("{err}");
    }
}

#[track_caller]
pub fn assert_is_search_for<S>(source: &S, expected: &str)
where
    S: SearchSource + ?Sized,
{
    if let Err(err) = check_is_search_for(source, expected) {
        panic!("{err}");
    }
}

#[track_caller]
pub fn assert_is_not_search_for<S>(source: &S, expected: &str)
where
    S: SearchSource + ?Sized,
{
    if let Err(err) = check_is_not_search_for(source, expected) {
        panic!("{err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::session::RecordingSession;

    fn session() -> RecordingSession {
        let mut session = RecordingSession::new();
        session.search(["Post"], |s| {
            s.with("blog_id", 4);
        });
        session
    }

    #[test]
    fn test_check_has_search_params() {
        let session = session();
        assert!(check_has_search_params(&session, Operation::With, args!["blog_id", 4]).is_ok());

        let err =
            check_has_search_params(&session, Operation::With, args!["blog_id", 5]).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"expected search params: fq => ["type:Post", "blog_id:4"] to match expected: fq => ["blog_id:5"]"#
        );
    }

    #[test]
    fn test_check_has_no_search_params() {
        let session = session();
        assert!(
            check_has_no_search_params(&session, Operation::With, args!["blog_id", 5]).is_ok()
        );
        let err = check_has_no_search_params(&session, Operation::With, args!["blog_id", 4])
            .unwrap_err();
        assert!(matches!(err, MatchError::AssertionFailed(ref m) if m.contains("NOT to match")));
    }

    #[test]
    fn test_check_membership() {
        let session = session();
        assert!(check_is_search_for(&session, "Post").is_ok());
        assert!(check_is_not_search_for(&session, "Blog").is_ok());
        assert!(check_is_search_for(&session, "Blog").is_err());
        assert!(check_is_not_search_for(&session, "Post").is_err());
    }

    #[test]
    fn test_no_search_is_not_an_assertion_failure() {
        let session = RecordingSession::new();
        let err = check_has_no_search_params(&session, Operation::With, args!["blog_id", 4])
            .unwrap_err();
        assert!(matches!(err, MatchError::NoSearchFound));
    }

    #[test]
    #[should_panic(expected = "to match expected class: Blog")]
    fn test_assert_is_search_for_panics() {
        assert_is_search_for(&session(), "Blog");
    }

    #[test]
    #[should_panic(expected = "no search found")]
    fn test_assert_without_search_panics() {
        assert_has_search_params(&RecordingSession::new(), Operation::With, args!["blog_id", 4]);
    }
}
