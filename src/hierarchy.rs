use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entry::{NodeKind, UploadedRecord};
use crate::error::{PathProblem, TreeScanError};

// ---------------------------------------------------------------------------
// NodeId / Node
// ---------------------------------------------------------------------------

/// Index into the hierarchy's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single folder or file in the tree, stored in the [`Hierarchy`] arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// This node's own index in the arena.
    pub id: NodeId,

    /// Final path segment.
    pub name: String,

    /// Full slash-delimited path from the batch root.
    pub path: String,

    pub kind: NodeKind,

    /// Enclosing folder. `None` for nodes at the batch root.
    pub parent: Option<NodeId>,

    /// Child nodes in first-seen order. Always empty for files.
    pub children: Vec<NodeId>,

    /// Number of ancestor folders. Root-level nodes are depth 0.
    pub depth: usize,

    /// Text body. Empty for folders.
    pub content: Arc<str>,
}

impl Node {
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// The folder/file tree built from one batch of uploaded records.
///
/// The hierarchy owns every node; nodes refer to each other by [`NodeId`]
/// only. It is built once per batch and never changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    by_path: HashMap<String, NodeId>,
    skipped: Vec<String>,
}

impl Hierarchy {
    /// Build the tree for a batch of records.
    ///
    /// Every path is validated before anything is built, so a batch with a
    /// malformed path produces no tree at all.
    ///
    /// The first record that mentions a segment decides whether it is a
    /// folder or a file. Records that contradict an earlier decision (a
    /// file path that names an existing folder, a path that descends through
    /// an existing file, or a repeated file path) are left out of the tree
    /// and listed in [`skipped`](Self::skipped).
    ///
    /// # Errors
    ///
    /// [`TreeScanError::InvalidPath`] when a path is empty or has an empty
    /// segment (`"/a"`, `"a//b"`, `"a/"`).
    pub fn build(records: &[UploadedRecord]) -> Result<Self, TreeScanError> {
        for record in records {
            validate_path(&record.path)?;
        }

        let mut tree = Hierarchy::default();
        for record in records {
            tree.insert(record);
        }

        tracing::debug!(
            records = records.len(),
            nodes = tree.nodes.len(),
            skipped = tree.skipped.len(),
            "hierarchy built"
        );
        Ok(tree)
    }

    fn insert(&mut self, record: &UploadedRecord) {
        let segments: Vec<&str> = record.path.split('/').collect();
        let last = segments.len() - 1;

        let mut parent: Option<NodeId> = None;
        let mut end = 0;

        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                end += 1;
            }
            end += segment.len();
            let prefix = &record.path[..end];
            let is_last = i == last;

            match self.by_path.get(prefix).copied() {
                Some(id) => {
                    let existing = self.nodes[id.index()].kind;
                    if is_last || existing == NodeKind::File {
                        tracing::warn!(
                            path = %record.path,
                            conflict = %prefix,
                            existing = ?existing,
                            "record conflicts with an earlier record, skipped"
                        );
                        self.skipped.push(record.path.clone());
                        return;
                    }
                    parent = Some(id);
                }
                None => {
                    let (kind, content) = if is_last {
                        (NodeKind::File, Arc::from(record.content.as_str()))
                    } else {
                        (NodeKind::Folder, Arc::from(""))
                    };
                    parent = Some(self.push(parent, segment, prefix, kind, content));
                }
            }
        }
    }

    fn push(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        path: &str,
        kind: NodeKind,
        content: Arc<str>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let depth = parent.map_or(0, |p| self.nodes[p.index()].depth + 1);

        self.nodes.push(Node {
            id,
            name: name.to_string(),
            path: path.to_string(),
            kind,
            parent,
            children: Vec::new(),
            depth,
            content,
        });
        self.by_path.insert(path.to_string(), id);

        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    // ── Access ────────────────────────────────────────────────────────────

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Look a node up by its full path.
    pub fn find(&self, path: &str) -> Option<&Node> {
        self.by_path.get(path).map(|id| self.get(*id))
    }

    /// Root-level nodes in first-seen order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of a node in first-seen order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.nodes[id.index()].children.iter().map(|c| self.get(*c))
    }

    /// Total number of nodes, folders included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of file nodes. This is the scan total for the batch.
    pub fn file_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_folder()).count()
    }

    /// Paths of records left out of the tree by the first-occurrence rule.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Depth-first, parent-before-children walk in first-seen order.
    pub fn flatten(&self) -> Flatten<'_> {
        Flatten {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }
}

/// Iterator returned by [`Hierarchy::flatten`].
pub struct Flatten<'a> {
    tree: &'a Hierarchy,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.tree.get(self.stack.pop()?);
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

fn validate_path(path: &str) -> Result<(), TreeScanError> {
    let problem = if path.is_empty() {
        Some(PathProblem::Empty)
    } else {
        path.split('/')
            .position(str::is_empty)
            .map(|index| PathProblem::EmptySegment { index })
    };

    match problem {
        Some(problem) => Err(TreeScanError::InvalidPath {
            path: path.to_string(),
            problem,
        }),
        None => Ok(()),
    }
}
