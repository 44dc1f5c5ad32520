//! Compilation errors and actionable error formatting.
//!
//! [`CompileError`] is what the compiler returns; [`ActionableError`] wraps a
//! message with possible causes and remediation steps for display on the
//! command line.

use crate::domain::ColorField;
use std::fmt;
use thiserror::Error;

/// Errors that abort a compilation. No partial document is ever produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A category color is not `#rgb` or `#rrggbb`
    #[error("Category '{category}' has an invalid {field} color '{value}'")]
    InvalidColor {
        category: String,
        field: ColorField,
        value: String,
    },
    /// A dependency names an issue that is not part of the plan
    #[error("Issue {item} depends on unknown issue {dependency}")]
    UnresolvedDependency { item: String, dependency: String },
    /// Following parent references leads back to the start
    #[error("Parent cycle detected: {}", .cycle.join(" -> "))]
    ParentCycle { cycle: Vec<String> },
    /// The same external id appears more than once
    #[error("Duplicate issue id: {id}")]
    DuplicateItem { id: String },
    /// Two external ids sanitize to the same DOT identifier
    #[error("Issues {first} and {second} both map to identifier {identifier}")]
    IdentifierCollision {
        first: String,
        second: String,
        identifier: String,
    },
    /// An external id sanitizes to a DOT keyword such as `node` or `graph`
    #[error("Issue {id} maps to identifier {identifier}, which is a DOT keyword")]
    ReservedIdentifier { id: String, identifier: String },
}

impl CompileError {
    /// Stable error code for JSON output
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::InvalidColor { .. } => "INVALID_COLOR",
            CompileError::UnresolvedDependency { .. } => "UNRESOLVED_DEPENDENCY",
            CompileError::ParentCycle { .. } => "PARENT_CYCLE",
            CompileError::DuplicateItem { .. } => "DUPLICATE_ITEM",
            CompileError::IdentifierCollision { .. } => "IDENTIFIER_COLLISION",
            CompileError::ReservedIdentifier { .. } => "RESERVED_IDENTIFIER",
        }
    }

    /// Attach causes and remedies for display
    pub fn to_actionable(&self) -> ActionableError {
        let error = ActionableError::new(self.to_string());
        match self {
            CompileError::InvalidColor { category, .. } => error
                .with_cause("Colors must be '#' followed by 3 or 6 hex digits")
                .with_remedy(format!(
                    "Fix the color of category '{}' in the plan file",
                    category
                )),
            CompileError::UnresolvedDependency { dependency, .. } => error
                .with_cause(format!("Issue {} was not included in the export", dependency))
                .with_cause("The dependency may point to an issue in another project")
                .with_remedy("Widen the saved query used for the export")
                .with_remedy("Drop such edges instead: --missing-dependencies drop"),
            CompileError::ParentCycle { .. } => error
                .with_cause("An issue is (transitively) its own parent")
                .with_remedy("Fix the parent links in the issue tracker"),
            CompileError::DuplicateItem { .. } => error
                .with_cause("The plan file lists the same issue twice")
                .with_remedy("Remove the duplicate entry from the plan file"),
            CompileError::IdentifierCollision { .. } => error
                .with_cause("Ids differing only in punctuation map to the same identifier")
                .with_remedy("Rename one of the issues so their ids stay distinct"),
            CompileError::ReservedIdentifier { .. } => error
                .with_cause("Keywords would turn the node into a default-attribute statement")
                .with_remedy("Give the issue an id with a project prefix, e.g. PROJ-1"),
        }
    }
}

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use planviz::errors::ActionableError;
///
/// let error = ActionableError::new("Plan file not found: plan.json")
///     .with_cause("The path may be relative to another directory")
///     .with_remedy("Pass an absolute path: planviz render /path/to/plan.json");
///
/// assert!(error.to_error_message().contains("To fix:"));
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    /// The main error message
    error: String,
    /// Possible causes (diagnostic hints)
    causes: Vec<String>,
    /// Remediation steps (how to fix)
    remediation: Vec<String>,
}

impl ActionableError {
    /// Create a new actionable error with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// Suggestions for JSON output: causes first, then remedies
    pub fn suggestions(&self) -> Vec<String> {
        self.causes
            .iter()
            .chain(self.remediation.iter())
            .cloned()
            .collect()
    }

    /// Convert to a formatted error message suitable for display.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("Error: {}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

/// Error for a plan file that does not exist.
pub fn plan_not_found(path: &str) -> ActionableError {
    ActionableError::new(format!("Plan file not found: {}", path))
        .with_cause("The path may be misspelled")
        .with_cause("The path is resolved relative to the current directory")
        .with_remedy("Check the path: ls -l <plan>")
}
