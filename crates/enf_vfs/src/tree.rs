//! Merged path tree over the entries of one or more archives.
//!
//! Entry names are `/`-separated paths. The tree holds lookup keys into the
//! session's archives, never entry bytes, so it stays cheap no matter how
//! large the archives are. Sibling order is first-seen order.

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::warn;

/// Lookup key for a file placed in the tree: which archive of the session
/// it came from and the entry index inside that archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRef {
    pub archive: usize,
    pub entry: usize,
}

/// One node of the merged tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PakNode {
    /// Child nodes keyed by path segment, in first-seen order.
    Directory(IndexMap<String, PakNode>),
    File(FileRef),
}

impl PakNode {
    pub fn is_file(&self) -> bool {
        matches!(self, PakNode::File(_))
    }

    pub fn file(&self) -> Option<FileRef> {
        match self {
            PakNode::File(file) => Some(*file),
            PakNode::Directory(_) => None,
        }
    }

    pub fn children(&self) -> Option<&IndexMap<String, PakNode>> {
        match self {
            PakNode::Directory(children) => Some(children),
            PakNode::File(_) => None,
        }
    }

    /// Look up a node by `/`-separated path below this one.
    pub fn get(&self, path: &str) -> Option<&PakNode> {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.children()?.get(segment)?;
        }
        Some(node)
    }

    /// Number of file leaves under this node.
    pub fn file_count(&self) -> usize {
        match self {
            PakNode::File(_) => 1,
            PakNode::Directory(children) => children.values().map(PakNode::file_count).sum(),
        }
    }

    fn collect_files(&self, prefix: String, files: &mut Vec<(String, FileRef)>) {
        match self {
            PakNode::File(file) => files.push((prefix, *file)),
            PakNode::Directory(children) => {
                for (name, child) in children {
                    let path = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}/{name}")
                    };
                    child.collect_files(path, files);
                }
            }
        }
    }
}

/// A path that could not be placed because an earlier entry already owns
/// one of its nodes. The earlier entry stays; the later one is recorded
/// here and otherwise dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConflict {
    pub path: String,
    /// Archive the losing entry came from.
    pub archive: usize,
}

/// Builds and owns the merged tree. Inserts never fail and never replace
/// an existing node; collisions are recorded as [`TreeConflict`]s.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    root: IndexMap<String, PakNode>,
    conflicts: Vec<TreeConflict>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// Top-level nodes of the merged tree.
    pub fn root(&self) -> &IndexMap<String, PakNode> {
        &self.root
    }

    pub fn conflicts(&self) -> &[TreeConflict] {
        &self.conflicts
    }

    /// Look up a node by `/`-separated path.
    pub fn get(&self, path: &str) -> Option<&PakNode> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut node = self.root.get(first)?;
        for segment in segments {
            node = node.children()?.get(segment)?;
        }
        Some(node)
    }

    /// Total number of file leaves in the tree.
    pub fn file_count(&self) -> usize {
        self.root.values().map(PakNode::file_count).sum()
    }

    /// Every file in the tree with its full path, depth first in sibling
    /// order.
    pub fn files(&self) -> Vec<(String, FileRef)> {
        let mut files = Vec::new();
        for (name, child) in &self.root {
            child.collect_files(name.clone(), &mut files);
        }
        files
    }

    /// Place `file` at `path`, creating directories along the way. Empty
    /// path segments are ignored.
    pub fn insert(&mut self, path: &str, file: FileRef) {
        if !self.try_insert(path, file) {
            warn!(path, archive = file.archive, "tree conflict, earlier entry wins");
            self.conflicts.push(TreeConflict {
                path: path.to_string(),
                archive: file.archive,
            });
        }
    }

    fn try_insert(&mut self, path: &str, file: FileRef) -> bool {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((leaf, dirs)) = segments.split_last() else {
            return false;
        };

        let mut node = &mut self.root;
        for dir in dirs {
            let child = node
                .entry((*dir).to_string())
                .or_insert_with(|| PakNode::Directory(IndexMap::new()));
            match child {
                PakNode::Directory(children) => node = children,
                PakNode::File(_) => return false,
            }
        }

        match node.entry((*leaf).to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(PakNode::File(file));
                true
            }
        }
    }
}
