//! Issue forest reconstruction from parent references.
//!
//! [`Forest::build`] turns a flat, ordered list of [`SourceItem`]s into an
//! arena of [`GraphNode`]s. Children keep the input order of the items that
//! name them as parent; roots keep the input order of parentless items.
//! Parent and dependency links are arena indices, never owning pointers.

use crate::domain::{Category, Directory, SourceItem};
use crate::errors::CompileError;
use crate::sanitize::{escape_for_label, identifier_for, is_reserved_identifier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Index of a node in its [`Forest`]
pub type NodeId = usize;

/// What to do with a dependency on an issue that is not part of the plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MissingDependencyPolicy {
    /// Fail the whole compilation
    #[default]
    Reject,
    /// Skip the edge and log a warning
    Drop,
}

impl fmt::Display for MissingDependencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingDependencyPolicy::Reject => write!(f, "reject"),
            MissingDependencyPolicy::Drop => write!(f, "drop"),
        }
    }
}

/// One issue in the forest, with display attributes already derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// DOT identifier derived from the external id
    pub id: String,
    pub external_id: String,
    /// Summary escaped for HTML-like labels
    pub display_label: String,
    pub resolved: bool,
    pub assignee_name: Option<String>,
    pub category: Option<Category>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub dependencies: Vec<NodeId>,
}

impl GraphNode {
    /// A node with at least one child is rendered as a cluster
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena of issue nodes plus the ordered list of roots
#[derive(Debug, Clone)]
pub struct Forest {
    nodes: Vec<GraphNode>,
    roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
}

impl Forest {
    /// Build the forest for one compilation.
    ///
    /// A parent id that matches no item makes the item a root. Unknown
    /// assignees and categories are treated as absent. Dependencies on
    /// unknown items are handled according to `policy`.
    pub fn build(
        items: &[SourceItem],
        directory: &Directory,
        category_field: Option<&str>,
        policy: MissingDependencyPolicy,
    ) -> Result<Self, CompileError> {
        let index = index_items(items)?;

        let mut identifiers: HashMap<String, NodeId> = HashMap::with_capacity(items.len());
        let mut nodes = Vec::with_capacity(items.len());
        for (node_id, item) in items.iter().enumerate() {
            let id = identifier_for(&item.id);
            if let Some(&first) = identifiers.get(&id) {
                return Err(CompileError::IdentifierCollision {
                    first: items[first].id.clone(),
                    second: item.id.clone(),
                    identifier: id,
                });
            }
            if is_reserved_identifier(&id) {
                return Err(CompileError::ReservedIdentifier {
                    id: item.id.clone(),
                    identifier: id,
                });
            }
            identifiers.insert(id.clone(), node_id);

            nodes.push(GraphNode {
                id,
                external_id: item.id.clone(),
                display_label: escape_for_label(&item.summary),
                resolved: item.resolved,
                assignee_name: item
                    .assignee
                    .as_deref()
                    .and_then(|user| directory.user_name(user))
                    .map(str::to_string),
                category: item
                    .category_ref(category_field)
                    .and_then(|category| directory.category(category))
                    .cloned(),
                parent: None,
                children: Vec::new(),
                dependencies: Vec::new(),
            });
        }

        let parents = parent_links(items, &index);
        if let Some(cycle) = parent_cycles(&parents).into_iter().next() {
            let mut cycle: Vec<String> = cycle.iter().map(|&i| items[i].id.clone()).collect();
            if let Some(first) = cycle.first().cloned() {
                cycle.push(first);
            }
            return Err(CompileError::ParentCycle { cycle });
        }

        let mut roots = Vec::new();
        for (node_id, parent) in parents.iter().enumerate() {
            nodes[node_id].parent = *parent;
            match parent {
                Some(parent_id) => nodes[*parent_id].children.push(node_id),
                None => roots.push(node_id),
            }
        }

        let mut edge_count = 0;
        for (node_id, item) in items.iter().enumerate() {
            for dependency in &item.dependencies {
                match index.get(dependency.as_str()) {
                    Some(&dependency_id) => {
                        nodes[node_id].dependencies.push(dependency_id);
                        edge_count += 1;
                    }
                    None => match policy {
                        MissingDependencyPolicy::Reject => {
                            return Err(CompileError::UnresolvedDependency {
                                item: item.id.clone(),
                                dependency: dependency.clone(),
                            });
                        }
                        MissingDependencyPolicy::Drop => {
                            warn!(
                                item = %item.id,
                                dependency = %dependency,
                                "dropping dependency on unknown issue"
                            );
                        }
                    },
                }
            }
        }

        debug!(
            nodes = nodes.len(),
            roots = roots.len(),
            edges = edge_count,
            "built issue forest"
        );

        let index = index
            .into_iter()
            .map(|(external_id, node_id)| (external_id.to_string(), node_id))
            .collect();

        Ok(Self {
            nodes,
            roots,
            index,
        })
    }

    /// Root nodes in input order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Look up a node by the external id of its item
    pub fn find(&self, external_id: &str) -> Option<NodeId> {
        self.index.get(external_id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Map external ids to positions, rejecting duplicates
fn index_items(items: &[SourceItem]) -> Result<HashMap<&str, NodeId>, CompileError> {
    let mut index = HashMap::with_capacity(items.len());
    for (node_id, item) in items.iter().enumerate() {
        if index.insert(item.id.as_str(), node_id).is_some() {
            return Err(CompileError::DuplicateItem {
                id: item.id.clone(),
            });
        }
    }
    Ok(index)
}

/// Resolve each item's parent id to a position; unknown parents become `None`
pub(crate) fn parent_links(
    items: &[SourceItem],
    index: &HashMap<&str, NodeId>,
) -> Vec<Option<NodeId>> {
    items
        .iter()
        .map(|item| item.parent_id().and_then(|parent| index.get(parent).copied()))
        .collect()
}

/// Find every cycle in a parent-link table.
///
/// Each cycle is reported once, starting at the first member reached while
/// walking up from the items in input order, and listed child before parent.
pub(crate) fn parent_cycles(parents: &[Option<NodeId>]) -> Vec<Vec<NodeId>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; parents.len()];
    let mut cycles = Vec::new();
    let mut path = Vec::new();

    for start in 0..parents.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        let mut current = Some(start);
        while let Some(node) = current {
            match marks[node] {
                Mark::Unvisited => {
                    marks[node] = Mark::OnPath;
                    path.push(node);
                    current = parents[node];
                }
                Mark::OnPath => {
                    if let Some(pos) = path.iter().position(|&n| n == node) {
                        cycles.push(path[pos..].to_vec());
                    }
                    break;
                }
                Mark::Done => break,
            }
        }

        for node in path.drain(..) {
            marks[node] = Mark::Done;
        }
    }

    cycles
}
