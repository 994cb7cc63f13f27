//! Class-membership matcher: was the latest search issued for a type?

use crate::error::Result;
use crate::session::{RecordedOperation, SearchSource};

/// Checks that a document type is among the types of the resolved search.
#[derive(Debug, Clone)]
pub struct SearchForMatcher<'s> {
    search: &'s RecordedOperation,
    expected: String,
}

impl<'s> SearchForMatcher<'s> {
    /// Resolve the search under assertion. Fails with `NoSearchFound` when
    /// nothing was recorded.
    pub fn new<S>(source: &'s S, expected: impl Into<String>) -> Result<Self>
    where
        S: SearchSource + ?Sized,
    {
        Ok(Self {
            search: source.resolve()?,
            expected: expected.into(),
        })
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn matches(&self) -> bool {
        self.search.includes_type(&self.expected)
    }

    pub fn missing_type_error_message(&self) -> String {
        format!(
            "expected search class: {} to match expected class: {}",
            self.search_types(),
            self.expected
        )
    }

    pub fn unexpected_type_error_message(&self) -> String {
        format!(
            "expected search class: {} NOT to match expected class: {}",
            self.search_types(),
            self.expected
        )
    }

    fn search_types(&self) -> String {
        self.search.types().join(" and ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchError;
    use crate::session::RecordingSession;

    fn session(types: &[&str]) -> RecordingSession {
        let mut session = RecordingSession::new();
        session.search(types.iter().copied(), |_| {});
        session
    }

    #[test]
    fn test_membership_ignores_other_types() {
        let session = session(&["Post", "Blog"]);
        assert!(SearchForMatcher::new(&session, "Blog").unwrap().matches());
        assert!(!SearchForMatcher::new(&session, "Comment").unwrap().matches());
    }

    #[test]
    fn test_membership_messages() {
        let session = session(&["Post", "Blog"]);
        let matcher = SearchForMatcher::new(&session, "Comment").unwrap();
        assert_eq!(
            matcher.missing_type_error_message(),
            "expected search class: Post and Blog to match expected class: Comment"
        );
        assert_eq!(
            matcher.unexpected_type_error_message(),
            "expected search class: Post and Blog NOT to match expected class: Comment"
        );
    }

    #[test]
    fn test_membership_requires_a_search() {
        let session = RecordingSession::new();
        let err = SearchForMatcher::new(&session, "Post").unwrap_err();
        assert!(matches!(err, MatchError::NoSearchFound));
    }
}
