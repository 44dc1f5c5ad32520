//! Plan checking.
//!
//! `render` stops at the first problem. [`check_plan`] walks the whole plan
//! instead and reports every problem it finds, split into errors (the plan
//! would not compile) and warnings (it compiles, but probably not the way
//! the author meant).

use crate::domain::{ColorField, Directory, SourceItem};
use crate::errors::CompileError;
use crate::forest::{parent_cycles, parent_links, MissingDependencyPolicy};
use crate::graph::DependencyGraph;
use crate::sanitize::{identifier_for, is_reserved_identifier, normalize_color};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Compilation would fail
    Error,
    /// Compiles, but likely not as intended
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One problem found in a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable code, shared with the JSON error codes for errors
    pub code: String,
    pub message: String,
    /// External id of the issue the problem belongs to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
}

impl Diagnostic {
    fn error(error: CompileError, item: Option<&str>) -> Self {
        Self {
            severity: Severity::Error,
            code: error.code().to_string(),
            message: error.to_string(),
            item: item.map(str::to_string),
        }
    }

    fn warning(code: &str, message: String, item: Option<&str>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            message,
            item: item.map(str::to_string),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

/// All diagnostics for one plan, in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Number of issues checked
    pub issues: usize,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        self.diagnostics.push(diagnostic);
    }

    /// Whether `render` would fail on this plan
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Check a plan and collect every problem found.
///
/// Errors are exactly the conditions under which compiling the same plan
/// with the same settings fails. When an id repeats, references resolve to
/// its first occurrence.
pub fn check_plan(
    items: &[SourceItem],
    directory: &Directory,
    category_field: Option<&str>,
    policy: MissingDependencyPolicy,
) -> CheckReport {
    let mut report = CheckReport {
        issues: items.len(),
        ..CheckReport::default()
    };

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        if index.contains_key(item.id.as_str()) {
            report.push(Diagnostic::error(
                CompileError::DuplicateItem {
                    id: item.id.clone(),
                },
                Some(&item.id),
            ));
        } else {
            index.insert(item.id.as_str(), position);
        }
    }

    let mut identifiers: HashMap<String, &str> = HashMap::with_capacity(items.len());
    for item in items {
        let identifier = identifier_for(&item.id);
        match identifiers.get(&identifier) {
            Some(&first) if first != item.id => report.push(Diagnostic::error(
                CompileError::IdentifierCollision {
                    first: first.to_string(),
                    second: item.id.clone(),
                    identifier,
                },
                Some(&item.id),
            )),
            Some(_) => {}
            None => {
                if is_reserved_identifier(&identifier) {
                    report.push(Diagnostic::error(
                        CompileError::ReservedIdentifier {
                            id: item.id.clone(),
                            identifier: identifier.clone(),
                        },
                        Some(&item.id),
                    ));
                }
                identifiers.insert(identifier, &item.id);
            }
        }
    }

    for item in items {
        if let Some(parent) = item.parent_id() {
            if !index.contains_key(parent) {
                report.push(Diagnostic::warning(
                    "UNKNOWN_PARENT",
                    format!(
                        "Issue {} has unknown parent {}; it is drawn as a root",
                        item.id, parent
                    ),
                    Some(&item.id),
                ));
            }
        }
    }

    let parents = parent_links(items, &index);
    for cycle in parent_cycles(&parents) {
        let mut ids: Vec<String> = cycle.iter().map(|&i| items[i].id.clone()).collect();
        let first = ids[0].clone();
        ids.push(first.clone());
        report.push(Diagnostic::error(
            CompileError::ParentCycle { cycle: ids },
            Some(&first),
        ));
    }

    let refs: Vec<&SourceItem> = items.iter().collect();
    let graph = DependencyGraph::new(&refs);
    for (item, dependency) in graph.unresolved_dependencies() {
        let error = CompileError::UnresolvedDependency {
            item: item.to_string(),
            dependency: dependency.to_string(),
        };
        report.push(match policy {
            MissingDependencyPolicy::Reject => Diagnostic::error(error, Some(item)),
            MissingDependencyPolicy::Drop => Diagnostic::warning(
                error.code(),
                format!("{}; the edge is dropped", error),
                Some(item),
            ),
        });
    }
    for cycle in graph.find_cycles() {
        report.push(Diagnostic::warning(
            "DEPENDENCY_CYCLE",
            format!("Dependency cycle: {}", cycle.join(" -> ")),
            cycle.first().map(String::as_str),
        ));
    }

    let mut used_categories = HashSet::new();
    for item in items {
        if let Some(assignee) = item.assignee.as_deref().filter(|a| !a.is_empty()) {
            if directory.user_name(assignee).is_none() {
                report.push(Diagnostic::warning(
                    "UNKNOWN_ASSIGNEE",
                    format!("Issue {} is assigned to unknown user {}", item.id, assignee),
                    Some(&item.id),
                ));
            }
        }
        if let Some(category) = item.category_ref(category_field) {
            if directory.category(category).is_some() {
                used_categories.insert(category);
            } else {
                report.push(Diagnostic::warning(
                    "UNKNOWN_CATEGORY",
                    format!("Issue {} has unknown category {}", item.id, category),
                    Some(&item.id),
                ));
            }
        }
    }

    for category in directory.categories() {
        for field in [ColorField::Foreground, ColorField::Background] {
            let Some(value) = category.color(field) else {
                continue;
            };
            if normalize_color(value).is_ok() {
                continue;
            }
            let error = CompileError::InvalidColor {
                category: category.id.clone(),
                field,
                value: value.to_string(),
            };
            report.push(if used_categories.contains(category.id.as_str()) {
                Diagnostic::error(error, None)
            } else {
                Diagnostic::warning(
                    error.code(),
                    format!("{} (no issue uses it)", error),
                    None,
                )
            });
        }
    }

    report
}
