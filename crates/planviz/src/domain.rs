//! Core domain types for plan compilation.
//!
//! This module defines the input side of the compiler: work items as exported
//! from the issue tracker, the users and categories they reference, and the
//! lookup tables built from them once per compilation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Foreground color used when an issue has no category or no foreground color.
pub const DEFAULT_FOREGROUND: &str = "#000000";

/// Background color used when an issue has no category or no background color.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// A work item as exported from the issue tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Globally unique external identifier (e.g., "XYZ-12")
    pub id: String,
    /// Free-text summary
    #[serde(default)]
    pub summary: String,
    /// Whether the issue has been resolved
    #[serde(default)]
    pub resolved: bool,
    /// User reference of the assignee
    #[serde(default)]
    pub assignee: Option<String>,
    /// Category (issue type) reference
    #[serde(default)]
    pub category: Option<String>,
    /// External id of the parent issue; empty or absent for roots
    #[serde(default)]
    pub parent: Option<String>,
    /// Custom field values keyed by field name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, String>,
    /// External ids of issues this issue depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl SourceItem {
    /// Create an open root item with no assignee, category or dependencies
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            resolved: false,
            assignee: None,
            category: None,
            parent: None,
            custom_fields: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }

    /// Parent id, treating an empty string the same as no parent
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref().filter(|parent| !parent.is_empty())
    }

    /// Category reference, falling back to the given custom field
    pub fn category_ref(&self, category_field: Option<&str>) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|category| !category.is_empty())
            .or_else(|| {
                category_field
                    .and_then(|field| self.custom_fields.get(field))
                    .map(String::as_str)
                    .filter(|category| !category.is_empty())
            })
    }
}

/// Enable dependency graph checks over raw source items
impl crate::graph::DependencyNode for SourceItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// A user known to the issue tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
}

/// Which of a category's two colors is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorField {
    /// Text and outline color
    Foreground,
    /// Fill color
    Background,
}

impl ColorField {
    /// Color used when the category does not set this field
    pub fn default_color(self) -> &'static str {
        match self {
            ColorField::Foreground => DEFAULT_FOREGROUND,
            ColorField::Background => DEFAULT_BACKGROUND,
        }
    }
}

impl fmt::Display for ColorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorField::Foreground => write!(f, "foreground"),
            ColorField::Background => write!(f, "background"),
        }
    }
}

/// Color pair of a category, either half optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryColors {
    #[serde(default)]
    pub foreground: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

impl CategoryColors {
    pub fn new(foreground: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            foreground: Some(foreground.into()),
            background: Some(background.into()),
        }
    }
}

/// An issue category (issue type), used to color nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<CategoryColors>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }

    pub fn with_colors(mut self, colors: CategoryColors) -> Self {
        self.color = Some(colors);
        self
    }

    /// The raw color literal for a field, if the category sets one
    pub fn color(&self, field: ColorField) -> Option<&str> {
        let colors = self.color.as_ref()?;
        match field {
            ColorField::Foreground => colors.foreground.as_deref(),
            ColorField::Background => colors.background.as_deref(),
        }
    }
}

/// Read-only lookup tables for user display names and categories
///
/// Built once by the caller; the compiler only reads it.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: HashMap<String, String>,
    categories: HashMap<String, Category>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: impl Into<String>, full_name: impl Into<String>) -> Self {
        self.users.insert(id.into(), full_name.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.insert(category.id.clone(), category);
        self
    }

    pub fn user_name(&self, id: &str) -> Option<&str> {
        self.users.get(id).map(String::as_str)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    /// All categories, ordered by id
    pub fn categories(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.values().collect();
        categories.sort_by(|a, b| a.id.cmp(&b.id));
        categories
    }
}

impl<U, C> From<(U, C)> for Directory
where
    U: IntoIterator<Item = User>,
    C: IntoIterator<Item = Category>,
{
    fn from((users, categories): (U, C)) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.id, user.full_name))
                .collect(),
            categories: categories
                .into_iter()
                .map(|category| (category.id.clone(), category))
                .collect(),
        }
    }
}
