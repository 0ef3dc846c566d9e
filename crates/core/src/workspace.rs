//! Partially-materialized remote directory tree.
//!
//! Nodes are addressed by absolute path. `children: None` means "not yet
//! fetched" and is distinct from `Some(vec![])`, a directory known to be
//! empty. Updates are path-scoped: only the owning branch is replaced, so
//! sibling and ancestor subtrees stay untouched.

use serde::{Deserialize, Serialize};

/// One entry of a directory listing, as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A node of the lazily-expanded tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub name: String,
    /// Absolute path; the identity key
    pub path: String,
    pub is_dir: bool,
    pub size: Option<u64>,
    /// `None` until the first successful listing of this directory
    pub children: Option<Vec<TreeNode>>,
    pub expanded: bool,
    pub loading: bool,
    /// Token of the in-flight listing fetch, while `loading`
    fetch_token: Option<u64>,
}

impl TreeNode {
    fn from_entry(parent_path: &str, entry: ListingEntry) -> Self {
        Self {
            path: join_path(parent_path, &entry.name),
            name: entry.name,
            is_dir: entry.is_dir,
            size: entry.size,
            children: None,
            expanded: false,
            loading: false,
            fetch_token: None,
        }
    }
}

/// What a toggle did, so the caller knows whether to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Cached children, now shown
    Expanded,
    /// Node collapsed; cached children retained
    Collapsed,
    /// No cached children; caller must fetch this path
    FetchNeeded,
    /// A pending fetch was abandoned; its response must be discarded
    FetchAbandoned,
    /// Path unknown or not a directory
    Ignored,
}

/// Single-slot file preview; replaced wholesale on each selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePreview {
    pub path: String,
    pub content: String,
}

/// The session's view of the remote workspace.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceTree {
    /// Resolved root path; fixed by the first successful listing
    root_path: Option<String>,
    roots: Vec<TreeNode>,
    pub preview: Option<FilePreview>,
    next_fetch_token: u64,
}

impl WorkspaceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Displayed workspace root label, once known.
    pub fn root_path(&self) -> Option<&str> {
        self.root_path.as_deref()
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn is_loaded(&self) -> bool {
        self.root_path.is_some()
    }

    /// Install the root listing. The first successful call pins the
    /// displayed root label for the rest of the session.
    pub fn install_root(&mut self, resolved_path: &str, entries: Vec<ListingEntry>) {
        let root = self
            .root_path
            .get_or_insert_with(|| resolved_path.trim_end_matches('/').to_string())
            .clone();
        self.roots = entries
            .into_iter()
            .map(|e| TreeNode::from_entry(&root, e))
            .collect();
    }

    /// Toggle a directory node.
    ///
    /// Cached children flip `expanded` only. Unfetched nodes start loading
    /// and report `FetchNeeded`; the issued fetch's token is then available
    /// from [`Self::pending_fetch_token`]. Toggling a loading node abandons
    /// the fetch, which arms the stale-response guard in
    /// [`Self::install_children`] and [`Self::fetch_failed`].
    pub fn toggle(&mut self, path: &str) -> ToggleOutcome {
        let token = self.next_fetch_token + 1;
        let Some(node) = find_node_mut(&mut self.roots, path) else {
            return ToggleOutcome::Ignored;
        };
        if !node.is_dir {
            return ToggleOutcome::Ignored;
        }
        if node.loading {
            node.loading = false;
            node.expanded = false;
            node.fetch_token = None;
            return ToggleOutcome::FetchAbandoned;
        }
        if node.children.is_some() {
            node.expanded = !node.expanded;
            return if node.expanded {
                ToggleOutcome::Expanded
            } else {
                ToggleOutcome::Collapsed
            };
        }
        node.loading = true;
        node.fetch_token = Some(token);
        self.next_fetch_token = token;
        ToggleOutcome::FetchNeeded
    }

    /// Token of the listing fetch currently in flight for `path`, if any.
    /// Responses must echo it back so late arrivals from superseded fetches
    /// are recognized as stale.
    pub fn pending_fetch_token(&self, path: &str) -> Option<u64> {
        let node = find_node(&self.roots, path)?;
        if node.loading {
            node.fetch_token
        } else {
            None
        }
    }

    /// Install fetched children for `path`. Returns `false` when the
    /// response is stale — the node is no longer loading, or the token
    /// belongs to a superseded fetch — and was discarded.
    pub fn install_children(&mut self, path: &str, token: u64, entries: Vec<ListingEntry>) -> bool {
        let Some(node) = find_node_mut(&mut self.roots, path) else {
            return false;
        };
        if !node.loading || node.fetch_token != Some(token) {
            return false;
        }
        let parent = node.path.clone();
        node.children = Some(
            entries
                .into_iter()
                .map(|e| TreeNode::from_entry(&parent, e))
                .collect(),
        );
        node.expanded = true;
        node.loading = false;
        node.fetch_token = None;
        true
    }

    /// The listing fetch `token` for `path` failed: clear `loading`, leave
    /// the node collapsed. Retry is simply re-toggling. Returns `false` when
    /// the failure is stale — same guard as [`Self::install_children`] — so
    /// a superseded fetch's late failure cannot knock out a fresh one.
    pub fn fetch_failed(&mut self, path: &str, token: u64) -> bool {
        let Some(node) = find_node_mut(&mut self.roots, path) else {
            return false;
        };
        if !node.loading || node.fetch_token != Some(token) {
            return false;
        }
        node.loading = false;
        node.expanded = false;
        node.fetch_token = None;
        true
    }

    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        find_node(&self.roots, path)
    }

    /// Replace the preview slot wholesale.
    pub fn set_preview(&mut self, path: &str, content: String) {
        self.preview = Some(FilePreview {
            path: path.to_string(),
            content,
        });
    }

    /// Visible rows in render order: depth-first through expanded nodes.
    pub fn visible(&self) -> Vec<(usize, &TreeNode)> {
        let mut out = Vec::new();
        flatten_into(&self.roots, 0, &mut out);
        out
    }
}

fn flatten_into<'a>(nodes: &'a [TreeNode], depth: usize, out: &mut Vec<(usize, &'a TreeNode)>) {
    for node in nodes {
        out.push((depth, node));
        if node.expanded {
            if let Some(children) = &node.children {
                flatten_into(children, depth + 1, out);
            }
        }
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Locate the owning branch by exact path match or prefix containment.
fn find_node_mut<'a>(nodes: &'a mut [TreeNode], path: &str) -> Option<&'a mut TreeNode> {
    for node in nodes {
        if node.path == path {
            return Some(node);
        }
        if path.starts_with(&node.path)
            && path.as_bytes().get(node.path.len()) == Some(&b'/')
        {
            return node
                .children
                .as_mut()
                .and_then(|children| find_node_mut(children, path));
        }
    }
    None
}

fn find_node<'a>(nodes: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.path == path {
            return Some(node);
        }
        if path.starts_with(&node.path)
            && path.as_bytes().get(node.path.len()) == Some(&b'/')
        {
            return node
                .children
                .as_ref()
                .and_then(|children| find_node(children, path));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(name: &str) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            is_dir: true,
            size: None,
        }
    }

    fn file(name: &str, size: u64) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            is_dir: false,
            size: Some(size),
        }
    }

    fn tree_with_root() -> WorkspaceTree {
        let mut tree = WorkspaceTree::new();
        tree.install_root("/work", vec![dir("src"), file("README.md", 120)]);
        tree
    }

    fn start_fetch(tree: &mut WorkspaceTree, path: &str) -> u64 {
        assert_eq!(tree.toggle(path), ToggleOutcome::FetchNeeded);
        tree.pending_fetch_token(path).unwrap()
    }

    #[test]
    fn root_listing_then_lazy_expansion() {
        let mut tree = tree_with_root();
        assert_eq!(tree.root_path(), Some("/work"));
        assert_eq!(tree.roots().len(), 2);

        let token = start_fetch(&mut tree, "/work/src");
        assert!(tree.install_children("/work/src", token, vec![file("index.ts", 300)]));

        let rows = tree.visible();
        let paths: Vec<&str> = rows.iter().map(|(_, n)| n.path.as_str()).collect();
        assert_eq!(paths, ["/work/src", "/work/src/index.ts", "/work/README.md"]);
        assert_eq!(rows[1].0, 1);
    }

    #[test]
    fn root_label_is_pinned_by_first_listing() {
        let mut tree = tree_with_root();
        tree.install_root("/elsewhere", vec![dir("other")]);
        assert_eq!(tree.root_path(), Some("/work"));
        assert_eq!(tree.roots()[0].name, "other");
    }

    #[test]
    fn cached_children_flip_expanded_without_fetch() {
        let mut tree = tree_with_root();
        let token = start_fetch(&mut tree, "/work/src");
        tree.install_children("/work/src", token, vec![file("main.rs", 10)]);

        assert_eq!(tree.toggle("/work/src"), ToggleOutcome::Collapsed);
        assert_eq!(tree.toggle("/work/src"), ToggleOutcome::Expanded);
        // Children survived both flips.
        let node = tree.find("/work/src").unwrap();
        assert_eq!(node.children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn sibling_subtrees_are_untouched_by_updates() {
        let mut tree = WorkspaceTree::new();
        tree.install_root("/a", vec![dir("b"), dir("c")]);
        let token = start_fetch(&mut tree, "/a/c");
        tree.install_children("/a/c", token, vec![file("kept.txt", 1)]);
        let before = tree.find("/a/c").cloned().unwrap();

        let token = start_fetch(&mut tree, "/a/b");
        tree.install_children("/a/b", token, vec![file("new.txt", 2)]);
        tree.toggle("/a/b");

        assert_eq!(tree.find("/a/c").unwrap(), &before);
    }

    #[test]
    fn stale_response_after_abandoned_fetch_is_discarded() {
        let mut tree = tree_with_root();
        let token = start_fetch(&mut tree, "/work/src");
        // User collapses before the response arrives.
        assert_eq!(tree.toggle("/work/src"), ToggleOutcome::FetchAbandoned);

        assert!(!tree.install_children("/work/src", token, vec![file("late.rs", 5)]));
        let node = tree.find("/work/src").unwrap();
        assert!(node.children.is_none());
        assert!(!node.expanded);
        assert!(!node.loading);
    }

    #[test]
    fn loaded_empty_is_distinct_from_not_fetched() {
        let mut tree = tree_with_root();
        let token = start_fetch(&mut tree, "/work/src");
        tree.install_children("/work/src", token, vec![]);
        let node = tree.find("/work/src").unwrap();
        assert_eq!(node.children.as_deref(), Some(&[] as &[TreeNode]));
        assert!(node.expanded);

        // Re-toggle flips only, no refetch.
        assert_eq!(tree.toggle("/work/src"), ToggleOutcome::Collapsed);
    }

    #[test]
    fn failed_fetch_clears_loading_and_allows_retry() {
        let mut tree = tree_with_root();
        let token = start_fetch(&mut tree, "/work/src");
        assert!(tree.fetch_failed("/work/src", token));
        let node = tree.find("/work/src").unwrap();
        assert!(!node.loading && !node.expanded);
        assert_eq!(tree.toggle("/work/src"), ToggleOutcome::FetchNeeded);
    }

    #[test]
    fn stale_failure_does_not_kill_a_fresh_fetch() {
        let mut tree = tree_with_root();
        // First fetch issued, then abandoned by collapsing.
        let stale_token = start_fetch(&mut tree, "/work/src");
        assert_eq!(tree.toggle("/work/src"), ToggleOutcome::FetchAbandoned);
        // Second fetch issued; the first one's failure arrives late.
        let fresh_token = start_fetch(&mut tree, "/work/src");
        assert!(!tree.fetch_failed("/work/src", stale_token));

        // The fresh fetch's response still installs.
        assert!(tree.install_children("/work/src", fresh_token, vec![file("fresh.rs", 7)]));
        let node = tree.find("/work/src").unwrap();
        assert_eq!(node.children.as_ref().map(Vec::len), Some(1));
        assert!(node.expanded);
    }

    #[test]
    fn stale_failure_after_completed_fetch_is_ignored() {
        let mut tree = tree_with_root();
        let token = start_fetch(&mut tree, "/work/src");
        tree.install_children("/work/src", token, vec![file("main.rs", 10)]);
        assert!(!tree.fetch_failed("/work/src", token));
        let node = tree.find("/work/src").unwrap();
        assert!(node.expanded);
        assert_eq!(node.children.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn toggling_a_file_is_ignored() {
        let mut tree = tree_with_root();
        assert_eq!(tree.toggle("/work/README.md"), ToggleOutcome::Ignored);
    }

    #[test]
    fn preview_slot_is_replaced_wholesale() {
        let mut tree = tree_with_root();
        tree.set_preview("/work/README.md", "first".to_string());
        tree.set_preview("/work/src/main.rs", "second".to_string());
        let preview = tree.preview.as_ref().unwrap();
        assert_eq!(preview.path, "/work/src/main.rs");
        assert_eq!(preview.content, "second");
    }

    #[test]
    fn prefix_containment_does_not_match_lookalike_names() {
        let mut tree = WorkspaceTree::new();
        tree.install_root("/a", vec![dir("src"), dir("src-old")]);
        let token = start_fetch(&mut tree, "/a/src-old");
        assert!(tree.install_children("/a/src-old", token, vec![file("x", 1)]));
        assert!(tree.find("/a/src").unwrap().children.is_none());
    }
}
