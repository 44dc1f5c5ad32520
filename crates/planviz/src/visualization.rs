//! DOT export of issue plans.
//!
//! Walks the issue forest depth-first and emits one nested
//! `subgraph cluster_<id>` per group and one node block per leaf. Dependency
//! edges are collected in a second buffer while walking and appended after
//! the tree, redirected to leaf anchors where an endpoint is a group.
//!
//! The walk keeps an explicit stack of sibling cursors, so hierarchy depth is
//! not limited by the call stack.

use crate::boundary::resolve_anchor;
use crate::domain::{ColorField, Directory, SourceItem};
use crate::errors::CompileError;
use crate::forest::{Forest, GraphNode, MissingDependencyPolicy, NodeId};
use crate::sanitize::{escape_for_label, escape_quoted, normalize_color};
use tracing::debug;

const PREAMBLE: &str = "digraph ProjectPlan {
  graph [
    fontname = \"helvetica\";
    style = \"rounded,filled\";
    target = \"_blank\";
  ];
  node [
    fontname = \"helvetica\";
    shape = box;
    style = \"rounded,filled\";
    target = \"_blank\";
  ];
  edge [
    fontname = \"helvetica\";
  ];

  rankdir = LR;
  compound = true;
  newrank = true;
  ranksep = 1;

";

/// Settings for one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Tracker base URL; issue links are `<base_url>issue/<id>`
    pub base_url: String,
    /// Custom field holding the category when an item has none set
    pub category_field: Option<String>,
    pub missing_dependencies: MissingDependencyPolicy,
}

impl CompileOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Compile work items into a DOT document
///
/// # Example
/// ```
/// use planviz::{compile, CompileOptions, Directory, SourceItem};
///
/// let epic = SourceItem::new("XYZ-1", "Epic");
/// let mut task = SourceItem::new("XYZ-2", "Task");
/// task.parent = Some("XYZ-1".to_string());
///
/// let dot = compile(
///     &[epic, task],
///     &Directory::new(),
///     &CompileOptions::new("https://tracker.example/"),
/// )
/// .unwrap();
/// assert!(dot.contains("subgraph cluster_XYZ_1 {"));
/// assert!(dot.contains("XYZ_2 ["));
/// ```
pub fn compile(
    items: &[SourceItem],
    directory: &Directory,
    options: &CompileOptions,
) -> Result<String, CompileError> {
    let forest = Forest::build(
        items,
        directory,
        options.category_field.as_deref(),
        options.missing_dependencies,
    )?;
    export_dot(&forest, &options.base_url)
}

/// Export an already built forest as a DOT document
///
/// Fails without output if any node's category color is malformed.
pub fn export_dot(forest: &Forest, base_url: &str) -> Result<String, CompileError> {
    let buffers = emit_forest(forest, base_url)?;

    let mut output =
        String::with_capacity(PREAMBLE.len() + buffers.nodes.len() + buffers.edges.len() + 4);
    output.push_str(PREAMBLE);
    output.push_str(&buffers.nodes);
    if !buffers.edges.is_empty() {
        output.push('\n');
        output.push_str(&buffers.edges);
    }
    output.push_str("}\n");

    debug!(bytes = output.len(), "exported DOT document");
    Ok(output)
}

/// Node/cluster text and deferred edge text, joined once at the end
#[derive(Debug, Default)]
struct DotBuffers {
    nodes: String,
    edges: String,
}

/// Position within one list of siblings
struct Cursor<'a> {
    siblings: &'a [NodeId],
    next: usize,
}

fn emit_forest(forest: &Forest, base_url: &str) -> Result<DotBuffers, CompileError> {
    let mut buffers = DotBuffers::default();
    let mut stack = vec![Cursor {
        siblings: forest.roots(),
        next: 0,
    }];

    while let Some(cursor) = stack.last_mut() {
        if cursor.next == cursor.siblings.len() {
            stack.pop();
            // The exhausted siblings were the children of the parent cursor's
            // current node, which is a group.
            if let Some(parent) = stack.last() {
                let group = forest.node(parent.siblings[parent.next - 1]);
                leave_node(&mut buffers, group, stack.len());
            }
            continue;
        }

        let node_id = cursor.siblings[cursor.next];
        cursor.next += 1;
        let depth = stack.len();

        enter_node(&mut buffers, forest, node_id, depth, base_url)?;
        let node = forest.node(node_id);
        if node.is_group() {
            stack.push(Cursor {
                siblings: &node.children,
                next: 0,
            });
        } else {
            leave_node(&mut buffers, node, depth);
        }
    }

    Ok(buffers)
}

fn enter_node(
    buffers: &mut DotBuffers,
    forest: &Forest,
    node_id: NodeId,
    depth: usize,
    base_url: &str,
) -> Result<(), CompileError> {
    let node = forest.node(node_id);
    let indent = "  ".repeat(depth);
    let foreground = node_color(node, ColorField::Foreground)?;
    let background = node_color(node, ColorField::Background)?;

    if node.is_group() {
        buffers
            .nodes
            .push_str(&format!("{}subgraph cluster_{} {{\n", indent, node.id));
    } else {
        buffers.nodes.push_str(&format!("{}{} [\n", indent, node.id));
    }
    buffers
        .nodes
        .push_str(&format!("{}  label = <{}>;\n", indent, node_label(node)));
    buffers.nodes.push_str(&format!(
        "{}  href = \"{}issue/{}\";\n",
        indent,
        escape_quoted(base_url),
        escape_quoted(&node.external_id)
    ));
    buffers
        .nodes
        .push_str(&format!("{}  fillcolor = \"{}\";\n", indent, background));
    buffers
        .nodes
        .push_str(&format!("{}  fontcolor = \"{}\";\n", indent, foreground));
    buffers
        .nodes
        .push_str(&format!("{}  color = \"{}\";\n", indent, foreground));
    if node.is_group() {
        buffers.nodes.push('\n');
    }

    let head = resolve_anchor(forest, node_id);
    for &dependency in &node.dependencies {
        let tail = resolve_anchor(forest, dependency);
        buffers.edges.push_str(&format!(
            "  {} -> {}",
            forest.node(tail.leaf).id,
            forest.node(head.leaf).id
        ));
        if tail.is_redirected() || head.is_redirected() {
            buffers.edges.push_str(" [\n");
            if let Some(cluster) = tail.cluster {
                buffers
                    .edges
                    .push_str(&format!("    ltail = cluster_{};\n", forest.node(cluster).id));
            }
            if let Some(cluster) = head.cluster {
                buffers
                    .edges
                    .push_str(&format!("    lhead = cluster_{};\n", forest.node(cluster).id));
            }
            buffers.edges.push_str("  ]");
        }
        buffers.edges.push('\n');
    }

    Ok(())
}

fn leave_node(buffers: &mut DotBuffers, node: &GraphNode, depth: usize) {
    let indent = "  ".repeat(depth);
    if node.is_group() {
        buffers.nodes.push_str(&format!("{}}}\n", indent));
    } else {
        buffers.nodes.push_str(&format!("{}]\n", indent));
    }
}

/// HTML-like label: `<id>: <summary>`, struck through when resolved, with
/// the assignee in a smaller font on a second line
fn node_label(node: &GraphNode) -> String {
    let (begin, end) = if node.resolved {
        ("<s>", "</s>")
    } else {
        ("", "")
    };
    let mut label = format!(
        "{}{}: {}{}",
        begin,
        escape_for_label(&node.external_id),
        node.display_label,
        end
    );
    if let Some(assignee) = &node.assignee_name {
        label.push_str(&format!(
            "<br/><font point-size=\"12\">{}</font>",
            escape_for_label(assignee)
        ));
    }
    label
}

fn node_color(node: &GraphNode, field: ColorField) -> Result<String, CompileError> {
    let color = node
        .category
        .as_ref()
        .and_then(|category| category.color(field))
        .unwrap_or(field.default_color());
    normalize_color(color).map_err(|e| CompileError::InvalidColor {
        category: node
            .category
            .as_ref()
            .map(|category| category.id.clone())
            .unwrap_or_default(),
        field,
        value: e.value,
    })
}
