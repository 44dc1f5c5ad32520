//! Project Plan Visualizer Library
//!
//! Compiles an ordered list of issues, with parent links and dependencies,
//! into a single Graphviz DOT document. Issues with children become nested
//! `cluster_` subgraphs; dependencies become edges, redirected to a leaf
//! inside a cluster when they start or end at a parent issue.
//!
//! ```
//! use planviz::{compile, CompileOptions, Directory, SourceItem};
//!
//! let mut task = SourceItem::new("XYZ-2", "Task");
//! task.dependencies.push("XYZ-1".to_string());
//! let items = vec![SourceItem::new("XYZ-1", "Design"), task];
//!
//! let dot = compile(&items, &Directory::new(), &CompileOptions::new("https://t/")).unwrap();
//! assert!(dot.contains("  XYZ_1 -> XYZ_2\n"));
//! ```

pub mod boundary;
pub mod check;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod forest;
pub mod graph;
pub mod output;
pub mod plan;
pub mod sanitize;
pub mod visualization;

// Re-export commonly used types
pub use check::{check_plan, CheckReport, Diagnostic, Severity};
pub use domain::{Category, CategoryColors, Directory, SourceItem, User};
pub use errors::CompileError;
pub use forest::{Forest, GraphNode, MissingDependencyPolicy};
pub use output::{ExitCode, JsonError, JsonOutput};
pub use plan::PlanFile;
pub use visualization::{compile, export_dot, CompileOptions};
