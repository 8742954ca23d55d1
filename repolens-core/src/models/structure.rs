//! Nested directory structure built from relative file paths
//!
//! Children are kept in a sorted map, so the tree depends only on the set of
//! inserted paths and never on the order they arrived in.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// A named child of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File,
    Directory(DirectoryNode),
}

/// A directory and its children. The root node has no name of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    children: BTreeMap<String, TreeNode>,
}

impl DirectoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a sequence of forward-slash relative paths into a tree
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = Self::new();
        for path in paths {
            root.insert_path(path.as_ref());
        }
        root
    }

    /// Insert one relative path: every segment but the last becomes a
    /// directory, the last becomes a file.
    ///
    /// A name that is needed as a directory wins over an earlier file entry
    /// of the same name, and a file never replaces a directory. Both rules
    /// keep the result independent of insertion order.
    pub fn insert_path(&mut self, relative_path: &str) {
        let mut segments = relative_path.split('/').filter(|s| !s.is_empty()).peekable();
        let mut current = self;

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current
                    .children
                    .entry(segment.to_string())
                    .or_insert(TreeNode::File);
                return;
            }

            let child = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::Directory(Self::new()));
            if matches!(child, TreeNode::File) {
                *child = TreeNode::Directory(Self::new());
            }
            current = match child {
                TreeNode::Directory(dir) => dir,
                TreeNode::File => unreachable!("file child was promoted to a directory"),
            };
        }
    }

    /// Names of files directly in this directory, sorted
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|(name, node)| match node {
            TreeNode::File => Some(name.as_str()),
            TreeNode::Directory(_) => None,
        })
    }

    /// Subdirectories directly in this directory, sorted by name
    pub fn dirs(&self) -> impl Iterator<Item = (&str, &Self)> {
        self.children.iter().filter_map(|(name, node)| match node {
            TreeNode::Directory(dir) => Some((name.as_str(), dir)),
            TreeNode::File => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.get(name)
    }

    /// Walk down a `/`-separated directory path
    pub fn dir(&self, path: &str) -> Option<&Self> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, segment| match node.children.get(segment) {
                Some(TreeNode::Directory(dir)) => Some(dir),
                _ => None,
            })
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of files in this directory and all below it
    pub fn file_count(&self) -> usize {
        self.children
            .values()
            .map(|node| match node {
                TreeNode::File => 1,
                TreeNode::Directory(dir) => dir.file_count(),
            })
            .sum()
    }
}

/// Serializes as `{"files": [...], "dirs": {name: node}}`, omitting either
/// key when it would be empty.
impl Serialize for DirectoryNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let files: Vec<&str> = self.files().collect();
        let dirs: BTreeMap<&str, &Self> = self.dirs().collect();

        let len = usize::from(!files.is_empty()) + usize::from(!dirs.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        if !files.is_empty() {
            map.serialize_entry("files", &files)?;
        }
        if !dirs.is_empty() {
            map.serialize_entry("dirs", &dirs)?;
        }
        map.end()
    }
}
