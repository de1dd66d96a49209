//! Full hierarchy expansion
//!
//! The tree lives in an arena of nodes; expansion runs off an explicit stack
//! of pending directories so nesting depth never grows the call stack.

use crate::directory::list_children;
use crate::directory::record::DirectoryRecord;
use crate::error::Result;
use crate::source::ImageSource;
use crate::types::RootDirectory;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Index of a node in a [`DirectoryTree`]
pub type NodeId = usize;

/// One record and its place in the hierarchy
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// The decoded record
    pub record: DirectoryRecord,

    /// Containing directory (`None` for the root)
    pub parent: Option<NodeId>,

    /// Children in on-disk order
    pub children: Vec<NodeId>,

    /// 0 for the root, 1 for its children, ...
    pub depth: usize,
}

/// Every record reachable from a root directory
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    nodes: Vec<TreeNode>,
}

impl DirectoryTree {
    /// Id of the root node
    pub const ROOT: NodeId = 0;

    /// The root directory node
    pub fn root(&self) -> &TreeNode {
        &self.nodes[Self::ROOT]
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Children of `id` in on-disk order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&child| &self.nodes[child])
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the root has no children
    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    /// Slash-separated path of a node (`"/"` for the root)
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(current) else {
                break;
            };
            if node.parent.is_some() {
                names.push(node.record.name.as_str());
            }
            cursor = node.parent;
        }

        if names.is_empty() {
            return String::from("/");
        }

        let mut path = String::new();
        for name in names.iter().rev() {
            path.push('/');
            path.push_str(name);
        }
        path
    }

    /// Depth-first pre-order walk over every node below the root
    pub fn iter(&self) -> TreeIter<'_> {
        let mut stack: Vec<NodeId> = self.root().children.clone();
        stack.reverse();
        TreeIter { tree: self, stack }
    }
}

/// Pre-order iterator returned by [`DirectoryTree::iter`]
pub struct TreeIter<'a> {
    tree: &'a DirectoryTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id];
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}

/// Expand the whole hierarchy below `root`
///
/// A directory whose extent has already been expanded is kept as a leaf;
/// well-formed images never point two directories at one extent.
pub fn walk_all<B: BlockIo>(
    source: &mut ImageSource<B>,
    root: &RootDirectory,
) -> Result<DirectoryTree> {
    let mut nodes = vec![TreeNode {
        record: root.record.clone(),
        parent: None,
        children: Vec::new(),
        depth: 0,
    }];
    let mut pending: Vec<(NodeId, u32, u32)> = vec![(DirectoryTree::ROOT, root.extent_lba, root.data_length)];
    let mut expanded = BTreeSet::new();

    while let Some((id, extent_lba, data_length)) = pending.pop() {
        if !expanded.insert(extent_lba) {
            log::warn!(
                "directory '{}' revisits extent {}, not expanding it again",
                nodes[id].record.name,
                extent_lba
            );
            continue;
        }

        let depth = nodes[id].depth + 1;
        let mut child_ids = Vec::new();
        for child in list_children(source, root, extent_lba, data_length) {
            let child = child?;
            let child_id = nodes.len();
            if child.is_directory() {
                pending.push((child_id, child.extent_lba, child.data_length));
            }
            nodes.push(TreeNode {
                record: child,
                parent: Some(id),
                children: Vec::new(),
                depth,
            });
            child_ids.push(child_id);
        }
        nodes[id].children = child_ids;
    }

    log::debug!("walked {} records", nodes.len() - 1);
    Ok(DirectoryTree { nodes })
}
