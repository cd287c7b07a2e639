//! Directory catalogs.
//!
//! Walks a directory and mirrors it as a tree of [`CatalogNode`]s. The index
//! page uses the top level of the components and examples trees as its
//! navigation listing.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

/// Kind of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// One filesystem entry in a catalog tree.
///
/// Directory nodes always carry a (possibly empty) child map; file nodes never
/// do. Children are keyed by file name and iterate in lexical order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogNode {
    name: String,
    kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<BTreeMap<String, CatalogNode>>,
}

impl CatalogNode {
    /// Create an empty directory node.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            children: Some(BTreeMap::new()),
        }
    }

    /// Create a file node.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            children: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Child entries, `None` for files.
    pub fn children(&self) -> Option<&BTreeMap<String, CatalogNode>> {
        self.children.as_ref()
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&CatalogNode> {
        self.children.as_ref()?.get(name)
    }

    /// Names of direct children in order.
    pub fn child_names(&self) -> Vec<&str> {
        self.children
            .iter()
            .flat_map(|children| children.keys())
            .map(String::as_str)
            .collect()
    }

    /// Consume the node and return its children, empty for files.
    pub fn into_children(self) -> BTreeMap<String, CatalogNode> {
        self.children.unwrap_or_default()
    }

    /// Copy of this node without the named direct children.
    pub fn without_children(&self, excluded: &[impl AsRef<str>]) -> Self {
        let mut node = self.clone();
        if let Some(children) = node.children.as_mut() {
            for name in excluded {
                children.remove(name.as_ref());
            }
        }
        node
    }

    /// Insert an entry at `segments` below this node, creating intermediate
    /// directories as needed.
    fn insert(&mut self, segments: &[String], kind: NodeKind) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let Some(children) = self.children.as_mut() else {
            return;
        };

        if rest.is_empty() {
            let node = match kind {
                NodeKind::Directory => CatalogNode::directory(first.clone()),
                NodeKind::File => CatalogNode::file(first.clone()),
            };
            children.entry(first.clone()).or_insert(node);
        } else {
            children
                .entry(first.clone())
                .or_insert_with(|| CatalogNode::directory(first.clone()))
                .insert(rest, kind);
        }
    }
}

/// Errors raised when the catalog root itself cannot be walked.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Build a catalog tree for the directory at `root`.
///
/// Entries that cannot be read below the root are skipped with a warning.
pub fn catalog(root: &Path) -> Result<CatalogNode, CatalogError> {
    let metadata = fs::metadata(root).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => CatalogError::RootNotFound(root.to_path_buf()),
        _ => CatalogError::Io {
            path: root.to_path_buf(),
            source,
        },
    })?;

    if !metadata.is_dir() {
        return Err(CatalogError::NotADirectory(root.to_path_buf()));
    }

    let root_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut tree = CatalogNode::directory(root_name);

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable catalog entry: {}", e);
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        let kind = if entry.file_type().is_dir() {
            NodeKind::Directory
        } else {
            NodeKind::File
        };

        tree.insert(&segments, kind);
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn mirrors_nested_directories() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("button/button.yaml"));
        touch(&root.join("button/macro.njk"));
        touch(&root.join("globals/tools/_helpers.scss"));
        touch(&root.join("README.md"));
        fs::create_dir_all(root.join("empty")).unwrap();

        let tree = catalog(root).unwrap();

        assert!(tree.is_dir());
        assert_eq!(
            tree.child_names(),
            vec!["README.md", "button", "empty", "globals"]
        );

        let button = tree.child("button").unwrap();
        assert_eq!(button.child_names(), vec!["button.yaml", "macro.njk"]);

        let helpers = tree
            .child("globals")
            .and_then(|g| g.child("tools"))
            .and_then(|t| t.child("_helpers.scss"))
            .unwrap();
        assert_eq!(helpers.kind(), NodeKind::File);
        assert!(helpers.children().is_none());

        let empty = tree.child("empty").unwrap();
        assert!(empty.is_dir());
        assert_eq!(empty.children().map(|c| c.len()), Some(0));
    }

    #[test]
    fn files_are_always_childless() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("a/b/c.txt"));
        touch(&temp.path().join("a/d.txt"));

        fn check(node: &CatalogNode) {
            match node.kind() {
                NodeKind::File => assert!(node.children().is_none()),
                NodeKind::Directory => {
                    for child in node.children().unwrap().values() {
                        check(child);
                    }
                }
            }
        }

        check(&catalog(temp.path()).unwrap());
    }

    #[test]
    fn independent_calls_return_equal_trees() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("tag/tag.yaml"));

        let first = catalog(temp.path()).unwrap();
        touch(&temp.path().join("panel/panel.yaml"));
        let second = catalog(temp.path()).unwrap();

        assert_eq!(first.child_names(), vec!["tag"]);
        assert_eq!(second.child_names(), vec!["panel", "tag"]);
    }

    #[test]
    fn removes_excluded_top_level_entries() {
        let temp = tempdir().unwrap();
        for name in ["all", "button", "globals", "icons", "tag"] {
            fs::create_dir_all(temp.path().join(name)).unwrap();
        }

        let tree = catalog(temp.path()).unwrap();
        let filtered = tree.without_children(&["globals", "all", "icons"]);

        assert_eq!(filtered.child_names(), vec!["button", "tag"]);
        assert_eq!(tree.child_names().len(), 5);
    }

    #[test]
    fn serializes_kind_and_children() {
        let mut tree = CatalogNode::directory("components");
        tree.insert(&["button".to_string()], NodeKind::Directory);
        tree.insert(
            &["button".to_string(), "button.yaml".to_string()],
            NodeKind::File,
        );

        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "components",
                "kind": "directory",
                "children": {
                    "button": {
                        "name": "button",
                        "kind": "directory",
                        "children": {
                            "button.yaml": { "name": "button.yaml", "kind": "file" }
                        }
                    }
                }
            })
        );
    }

    #[cfg(unix)]
    #[test]
    fn skips_unreadable_entries_and_keeps_walking() {
        use std::os::unix::fs::symlink;

        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("a")).unwrap();
        symlink(root, root.join("a/loop")).unwrap();
        symlink(root.join("nope"), root.join("dangling")).unwrap();
        touch(&root.join("f.txt"));

        let tree = catalog(root).unwrap();

        assert_eq!(tree.child_names(), vec!["a", "f.txt"]);
        assert!(tree.child("dangling").is_none());
        let a = tree.child("a").unwrap();
        assert!(a.is_dir());
        assert_eq!(a.child_names(), Vec::<&str>::new());
    }

    #[test]
    fn errors_on_missing_root() {
        let temp = tempdir().unwrap();

        let result = catalog(&temp.path().join("missing"));

        assert!(matches!(result, Err(CatalogError::RootNotFound(_))));
    }

    #[test]
    fn errors_on_file_root() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("file.txt");
        touch(&file);

        let result = catalog(&file);

        assert!(matches!(result, Err(CatalogError::NotADirectory(_))));
    }
}
