//! Recording spy for searches issued by code under test.
//!
//! A [`RecordingSession`] stands in for the search client while a test runs.
//! Each search is kept as a [`RecordedOperation`]: the document types searched
//! and the query that was built. Matchers only read recordings; they never
//! mutate a session.

use crate::error::{MatchError, Result};
use crate::query::{Query, SearchBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace};

/// One recorded search: the types it covered and the query that was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedOperation {
    types: Vec<String>,
    query: Query,
}

impl RecordedOperation {
    /// Create a recording. Duplicate type names are dropped, keeping the
    /// first occurrence.
    pub fn new<I, S>(types: I, query: Query) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in types.into_iter().map(Into::into) {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            types: unique,
            query,
        }
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn includes_type(&self, name: &str) -> bool {
        self.types.iter().any(|t| t == name)
    }
}

/// Anything an assertion can resolve a search from.
///
/// A session resolves to its most recent search; a single recorded operation
/// resolves to itself.
pub trait SearchSource {
    fn latest_search(&self) -> Option<&RecordedOperation>;

    /// Resolve the search under assertion, failing with
    /// [`MatchError::NoSearchFound`] when nothing was recorded.
    fn resolve(&self) -> Result<&RecordedOperation> {
        self.latest_search().ok_or(MatchError::NoSearchFound)
    }
}

impl SearchSource for RecordedOperation {
    fn latest_search(&self) -> Option<&RecordedOperation> {
        Some(self)
    }
}

/// Ordered, append-only list of recorded searches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingSession {
    searches: Vec<RecordedOperation>,
}

impl SearchSource for RecordingSession {
    fn latest_search(&self) -> Option<&RecordedOperation> {
        self.latest()
    }
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a search block against the spy and record the built query.
    pub fn search<I, S, F>(&mut self, types: I, block: F) -> &Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(&mut SearchBuilder),
    {
        let types: Vec<String> = types.into_iter().map(Into::into).collect();
        let query = build_search(&types, block);
        self.record(RecordedOperation::new(types, query))
    }

    /// Append an already built recording.
    pub fn record(&mut self, operation: RecordedOperation) -> &Query {
        debug!(
            "Recorded search #{} for types {:?}",
            self.searches.len() + 1,
            operation.types()
        );
        self.searches.push(operation);
        let index = self.searches.len() - 1;
        self.searches[index].query()
    }

    pub fn searches(&self) -> &[RecordedOperation] {
        &self.searches
    }

    /// The most recent search, if any.
    pub fn latest(&self) -> Option<&RecordedOperation> {
        self.searches.last()
    }

    pub fn len(&self) -> usize {
        self.searches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }

    /// Save the recorded searches to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved {} recorded searches to {:?}", self.searches.len(), path);
        Ok(())
    }

    /// Load a session previously written by [`save_to_file`](Self::save_to_file).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let session: RecordingSession = serde_json::from_str(&json)?;
        info!(
            "Loaded {} recorded searches from {:?}",
            session.searches.len(),
            path
        );
        Ok(session)
    }
}

/// Build a query for `types` by running `block` against a fresh builder.
///
/// This is the entry point matchers use to produce reference queries; it
/// never records anything.
pub fn build_search<S, F>(types: &[S], block: F) -> Query
where
    S: AsRef<str>,
    F: FnOnce(&mut SearchBuilder),
{
    let mut builder = SearchBuilder::new(types.iter().map(|t| t.as_ref().to_string()));
    block(&mut builder);
    trace!("Built search {:?}", builder.query());
    builder.build()
}

/// Fallible variant of [`build_search`] for blocks that validate their input.
pub fn try_build_search<S, F>(types: &[S], block: F) -> Result<Query>
where
    S: AsRef<str>,
    F: FnOnce(&mut SearchBuilder) -> Result<()>,
{
    let mut builder = SearchBuilder::new(types.iter().map(|t| t.as_ref().to_string()));
    block(&mut builder)?;
    trace!("Built search {:?}", builder.query());
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn test_empty_session_resolves_to_no_search() {
        let session = RecordingSession::new();
        assert!(matches!(session.resolve(), Err(MatchError::NoSearchFound)));
    }

    #[test]
    fn test_session_resolves_latest_search() {
        let mut session = RecordingSession::new();
        session.search(["Post"], |s| {
            s.keywords("first");
        });
        session.search(["Blog"], |s| {
            s.keywords("second");
        });

        let latest = session.resolve().unwrap();
        assert_eq!(latest.types(), ["Blog".to_string()]);
        assert_eq!(latest.query().to_params()["q"], ParamValue::text("second"));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_recorded_operation_resolves_to_itself() {
        let op = RecordedOperation::new(["Post"], Query::new(["Post"]));
        assert_eq!(op.resolve().unwrap(), &op);
    }

    #[test]
    fn test_recorded_types_are_deduplicated_in_order() {
        let op = RecordedOperation::new(["Post", "Blog", "Post"], Query::default());
        assert_eq!(op.types(), ["Post".to_string(), "Blog".to_string()]);
        assert!(op.includes_type("Blog"));
        assert!(!op.includes_type("Comment"));
    }

    #[test]
    fn test_try_build_search_propagates_errors() {
        let result = try_build_search(&["Post"], |_| {
            Err(MatchError::invalid_args("with", "missing value"))
        });
        assert!(matches!(result, Err(MatchError::InvalidArguments { .. })));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording.json");

        let mut session = RecordingSession::new();
        session.search(["Post"], |s| {
            s.keywords_in("pizza", ["title"]).with("blog_id", 4);
        });
        session.save_to_file(&path).unwrap();

        let loaded = RecordingSession::load_from_file(&path).unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RecordingSession::load_from_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(MatchError::Io(_))));
    }
}
