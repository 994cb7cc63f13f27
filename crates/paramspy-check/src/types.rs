//! Expectation file and report types.

use paramspy::Arg;
use serde::{Deserialize, Serialize};

/// Which assertion an expectation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectationKind {
    HasSearchParams,
    HasNoSearchParams,
    IsSearchFor,
    IsNotSearchFor,
}

impl ExpectationKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExpectationKind::HasSearchParams => "has_search_params",
            ExpectationKind::HasNoSearchParams => "has_no_search_params",
            ExpectationKind::IsSearchFor => "is_search_for",
            ExpectationKind::IsNotSearchFor => "is_not_search_for",
        }
    }
}

/// One assertion from an expectations file.
///
/// Parameter assertions name an `operation` and its positional `args`;
/// membership assertions name a `class`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpectationEntry {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: ExpectationKind,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub args: Vec<Arg>,
    #[serde(default)]
    pub class: Option<String>,
}

impl ExpectationEntry {
    /// Label used in reports: the explicit name, or a summary of the entry.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match (&self.operation, &self.class) {
            (Some(operation), _) => {
                let args: Vec<String> = self.args.iter().map(Arg::render).collect();
                format!("{} {}({})", self.kind.label(), operation, args.join(", "))
            }
            (None, Some(class)) => format!("{} {}", self.kind.label(), class),
            (None, None) => self.kind.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpectationFile {
    #[serde(default)]
    pub expectations: Vec<ExpectationEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    /// The assertion evaluated to false.
    Failed,
    /// The assertion could not be evaluated.
    Error,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Passed => "PASS",
            Status::Failed => "FAIL",
            Status::Error => "ERROR",
        }
    }
}

/// Result of running one expectation.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub kind: ExpectationKind,
    pub status: Status,
    pub message: Option<String>,
}

/// Result of running every expectation of a file.
#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    pub outcomes: Vec<CheckOutcome>,
    pub checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_outcome(&mut self, outcome: CheckOutcome) {
        self.checked += 1;
        match outcome.status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Error => self.errors += 1,
        }
        self.outcomes.push(outcome);
    }

    /// True when every expectation passed.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}
