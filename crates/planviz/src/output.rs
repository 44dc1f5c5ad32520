//! Structured output formatting for CLI commands.
//!
//! This module provides consistent JSON output formatting for both success
//! and error cases, plus the process exit codes the CLI reports.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt::{self, Display};
use std::io::{self, Write};

use crate::errors::CompileError;

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

// ============================================================================
// Output Context
// ============================================================================

/// Where command output goes, given `--quiet` and `--json`
pub struct OutputContext {
    quiet: bool,
    json: bool,
}

impl OutputContext {
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Write a document or report to stdout verbatim; nothing in `--json` mode
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        emit(&mut io::stdout(), format_args!("{}", msg))
    }

    /// Write one JSON envelope to stdout; nothing outside `--json` mode
    pub fn print_json(&self, json: &str) -> io::Result<()> {
        if !self.json {
            return Ok(());
        }
        emit(&mut io::stdout(), format_args!("{}\n", json))
    }

    /// Progress note on stderr, hidden by `--quiet` and `--json`
    pub fn print_info(&self, msg: impl Display) -> io::Result<()> {
        if !self.is_chatty() {
            return Ok(());
        }
        emit(&mut io::stderr(), format_args!("{}\n", msg))
    }

    /// Warning on stderr, hidden by `--quiet` and `--json`
    pub fn print_warning(&self, msg: impl Display) -> io::Result<()> {
        if !self.is_chatty() {
            return Ok(());
        }
        emit(&mut io::stderr(), format_args!("Warning: {}\n", msg))
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    fn is_chatty(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Write to a stream, exiting quietly once the reader has gone away
/// (`planviz render plan.json | head`).
fn emit(out: &mut impl Write, args: fmt::Arguments<'_>) -> io::Result<()> {
    match out.write_fmt(args) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => std::process::exit(0),
        result => result,
    }
}

// ============================================================================
// JSON Output Types
// ============================================================================

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    /// Create a new successful output with the given data
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output with suggestions
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

impl JsonError {
    /// Create a new error output
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
                suggestions: Vec::new(),
            },
            metadata: Metadata::new(command),
        }
    }

    /// Build the error output for a failed compilation
    pub fn from_compile_error(error: &CompileError, command: impl Into<String>) -> Self {
        let details = match error {
            CompileError::InvalidColor {
                category,
                field,
                value,
            } => serde_json::json!({
                "category": category,
                "field": field.to_string(),
                "value": value,
            }),
            CompileError::UnresolvedDependency { item, dependency } => {
                serde_json::json!({ "item": item, "dependency": dependency })
            }
            CompileError::ParentCycle { cycle } => serde_json::json!({ "cycle": cycle }),
            CompileError::DuplicateItem { id } => serde_json::json!({ "id": id }),
            CompileError::IdentifierCollision {
                first,
                second,
                identifier,
            } => serde_json::json!({
                "first": first,
                "second": second,
                "identifier": identifier,
            }),
            CompileError::ReservedIdentifier { id, identifier } => {
                serde_json::json!({ "id": id, "identifier": identifier })
            }
        };

        Self::new(error.code(), error.to_string(), command)
            .with_details(details)
            .with_suggestions(error.to_actionable().suggestions())
    }

    /// Add details to the error
    pub fn with_details(mut self, details: Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Add multiple suggestions to the error
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.error.suggestions.extend(suggestions);
        self
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ErrorCode::to_exit_code(&self.error.code)
    }
}

/// Error details including code, message, and suggestions
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "PARENT_CYCLE", "FILE_NOT_FOUND")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Suggested actions to resolve the error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

// ============================================================================
// Exit Codes
// ============================================================================

/// Standardized exit codes for the planviz CLI
///
/// # Examples
///
/// ```rust
/// use planviz::ExitCode;
///
/// assert_eq!(ExitCode::ValidationFailed.code(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,

    /// Generic error (1)
    GenericError = 1,

    /// Invalid arguments or usage error (2)
    InvalidArgument = 2,

    /// Plan or config file not found (3)
    NotFound = 3,

    /// Validation failed - parent cycle, bad color, unknown dependency (4)
    ValidationFailed = 4,

    /// External dependency failed - file system, etc. (10)
    ExternalError = 10,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

// ============================================================================
// Error Codes (String constants for JSON responses)
// ============================================================================

/// Standard error codes for planviz (JSON format)
pub struct ErrorCode;

impl ErrorCode {
    pub const FILE_NOT_FOUND: &'static str = "FILE_NOT_FOUND";
    pub const INVALID_COLOR: &'static str = "INVALID_COLOR";
    pub const UNRESOLVED_DEPENDENCY: &'static str = "UNRESOLVED_DEPENDENCY";
    pub const PARENT_CYCLE: &'static str = "PARENT_CYCLE";
    pub const DUPLICATE_ITEM: &'static str = "DUPLICATE_ITEM";
    pub const IDENTIFIER_COLLISION: &'static str = "IDENTIFIER_COLLISION";
    pub const RESERVED_IDENTIFIER: &'static str = "RESERVED_IDENTIFIER";
    pub const IO_ERROR: &'static str = "IO_ERROR";
    pub const PARSE_ERROR: &'static str = "PARSE_ERROR";

    /// Map error code string to exit code
    pub fn to_exit_code(code: &str) -> ExitCode {
        match code {
            Self::FILE_NOT_FOUND => ExitCode::NotFound,
            Self::INVALID_COLOR
            | Self::UNRESOLVED_DEPENDENCY
            | Self::PARENT_CYCLE
            | Self::DUPLICATE_ITEM
            | Self::IDENTIFIER_COLLISION
            | Self::RESERVED_IDENTIFIER => ExitCode::ValidationFailed,
            Self::PARSE_ERROR => ExitCode::InvalidArgument,
            Self::IO_ERROR => ExitCode::ExternalError,
            _ => ExitCode::GenericError,
        }
    }
}

/// Envelope metadata; the timestamp serializes as RFC 3339
#[derive(Debug, Serialize)]
pub struct Metadata {
    pub timestamp: DateTime<Utc>,
    /// JSON output format version
    pub version: String,
    pub command: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Response for `render` command
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    /// File the document was written to; absent when it is inlined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// The DOT document, unless written to a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot: Option<String>,
    /// Number of issues in the document
    pub issues: usize,
    /// Number of dependency edges in the document
    pub edges: usize,
}
