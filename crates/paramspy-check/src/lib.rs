//! Replay search parameter assertions against a recorded session.
//!
//! A session saved with [`RecordingSession::save_to_file`] can be checked
//! outside the test that produced it. Expectations are read from a YAML or
//! JSON file:
//!
//! ```yaml
//! expectations:
//!   - kind: is_search_for
//!     class: Post
//!   - name: filters by category
//!     kind: has_search_params
//!     operation: with
//!     args: [category_ids, [1, 2]]
//!   - kind: has_search_params
//!     operation: order_by
//!     args: [created_at, ANY_PARAM]
//! ```
//!
//! # Example
//!
//! ```no_run
//! use paramspy::RecordingSession;
//! use paramspy_check::{load_expectations, run_checks};
//! use std::path::Path;
//!
//! let session = RecordingSession::load_from_file(Path::new("recording.json")).unwrap();
//! let expectations = load_expectations(Path::new("expectations.yaml")).unwrap();
//! let report = run_checks(&session, &expectations);
//! assert!(report.is_success());
//! ```

mod types;

use paramspy::operation::resolve;
use paramspy::{
    check_has_no_search_params, check_has_search_params, check_is_not_search_for,
    check_is_search_for, MatchError, RecordingSession,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use types::{
    CheckOutcome, CheckReport, ExpectationEntry, ExpectationFile, ExpectationKind, Status,
};

/// Errors raised while loading an expectations file.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid YAML expectations: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON expectations: {0}")]
    Json(#[from] serde_json::Error),
}

/// Format of an expectations file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext == "json") {
            FileFormat::Json
        } else {
            FileFormat::Yaml
        }
    }
}

/// Load an expectations file, choosing the format from its extension.
pub fn load_expectations(path: &Path) -> Result<ExpectationFile, CheckError> {
    let content = std::fs::read_to_string(path).map_err(|source| CheckError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_expectations(&content, FileFormat::from_path(path))?;
    info!(
        "Loaded {} expectation(s) from {:?}",
        file.expectations.len(),
        path
    );
    Ok(file)
}

pub fn parse_expectations(content: &str, format: FileFormat) -> Result<ExpectationFile, CheckError> {
    let file = match format {
        FileFormat::Yaml => serde_yaml::from_str(content)?,
        FileFormat::Json => serde_json::from_str(content)?,
    };
    Ok(file)
}

/// Run every expectation against the session's most recent search.
pub fn run_checks(session: &RecordingSession, file: &ExpectationFile) -> CheckReport {
    let mut report = CheckReport::new();
    for entry in &file.expectations {
        report.add_outcome(run_expectation(session, entry));
    }
    debug!(
        "Checked {} expectation(s): {} passed, {} failed, {} errors",
        report.checked, report.passed, report.failed, report.errors
    );
    report
}

/// Run a single expectation.
pub fn run_expectation(session: &RecordingSession, entry: &ExpectationEntry) -> CheckOutcome {
    let (status, message) = match evaluate(session, entry) {
        Ok(()) => (Status::Passed, None),
        Err(MatchError::AssertionFailed(message)) => (Status::Failed, Some(message)),
        Err(err) => (Status::Error, Some(err.to_string())),
    };
    CheckOutcome {
        name: entry.display_name(),
        kind: entry.kind,
        status,
        message,
    }
}

fn evaluate(session: &RecordingSession, entry: &ExpectationEntry) -> paramspy::Result<()> {
    match entry.kind {
        ExpectationKind::HasSearchParams => {
            let operation = resolve(required(&entry.operation, "operation")?)?;
            check_has_search_params(session, operation, entry.args.clone())
        }
        ExpectationKind::HasNoSearchParams => {
            let operation = resolve(required(&entry.operation, "operation")?)?;
            check_has_no_search_params(session, operation, entry.args.clone())
        }
        ExpectationKind::IsSearchFor => {
            check_is_search_for(session, required(&entry.class, "class")?)
        }
        ExpectationKind::IsNotSearchFor => {
            check_is_not_search_for(session, required(&entry.class, "class")?)
        }
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> paramspy::Result<&'a str> {
    value.as_deref().ok_or_else(|| {
        MatchError::InvalidArguments {
            operation: "expectation",
            reason: format!("missing `{field}`"),
        }
    })
}
