use serde::Serialize;
use std::collections::HashMap;

use crate::selection::ResolvedFile;

/// Inclusion status of a tree node. Files are never `Partial`; a directory is
/// `Partial` when its descendants mix included and excluded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InclusionState {
    Included,
    Excluded,
    Partial,
}

/// A node of the aggregated project tree. Built fresh on every scan, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub name: String,
    /// Full `/`-separated path from the project root ("" for the root node)
    pub path: String,
    /// Sum of all descendant file sizes, included and excluded alike
    pub size_bytes: u64,
    pub included: InclusionState,
    pub children: Vec<TreeNode>,
}

/// Flattened parallel-array form of the tree for the visualization layer:
/// one entry per node, `ids[i]` the node's full path and `parents[i]` the
/// parent's id ("" for the root).
#[derive(Debug, Clone, Serialize)]
pub struct FlatTree {
    pub labels: Vec<String>,
    pub parents: Vec<String>,
    pub values: Vec<u64>,
    pub ids: Vec<String>,
    pub included: Vec<InclusionState>,
}

/// Arena node; the tree owns all nodes, children are indices. Avoids the
/// recursive lookup-map structure the tree would otherwise need.
struct ArenaNode {
    name: String,
    path: String,
    size_bytes: u64,
    leaf_count: u64,
    included_count: u64,
    children: Vec<usize>,
    leaf_included: bool,
    is_leaf: bool,
}

impl ArenaNode {
    fn new(name: &str, path: &str) -> Self {
        ArenaNode {
            name: name.to_string(),
            path: path.to_string(),
            size_bytes: 0,
            leaf_count: 0,
            included_count: 0,
            children: Vec::new(),
            leaf_included: false,
            is_leaf: false,
        }
    }

    fn state(&self) -> InclusionState {
        if self.is_leaf {
            if self.leaf_included {
                InclusionState::Included
            } else {
                InclusionState::Excluded
            }
        } else if self.leaf_count > 0 && self.included_count == self.leaf_count {
            InclusionState::Included
        } else if self.included_count == 0 {
            InclusionState::Excluded
        } else {
            InclusionState::Partial
        }
    }
}

/// Fold the flat resolved-file list into a hierarchical tree with aggregated
/// sizes and inclusion status.
///
/// Only directories containing at least one scanned file appear: files kept
/// out by push roots or ignore rules never reach the resolver, so their
/// directories never materialize, while files merely *excluded* by patterns
/// still occupy nodes (users can see what is deliberately left out).
pub fn build(resolved: &[ResolvedFile], root_name: &str) -> TreeNode {
    let mut arena: Vec<ArenaNode> = vec![ArenaNode::new(root_name, "")];
    let mut index: HashMap<String, usize> = HashMap::new();

    for file in resolved {
        let path = &file.record.relative_path;
        let size = file.record.size_bytes;
        let included = u64::from(file.included);

        // Fold this file into the root and every intermediate directory,
        // creating directory nodes on first touch.
        arena[0].size_bytes += size;
        arena[0].leaf_count += 1;
        arena[0].included_count += included;

        let mut parent = 0usize;
        let mut prefix = String::new();

        let segments: Vec<&str> = path.split('/').collect();
        for segment in &segments[..segments.len() - 1] {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);

            let node = match index.get(&prefix) {
                Some(&idx) => idx,
                None => {
                    let idx = arena.len();
                    arena.push(ArenaNode::new(segment, &prefix));
                    arena[parent].children.push(idx);
                    index.insert(prefix.clone(), idx);
                    idx
                }
            };
            arena[node].size_bytes += size;
            arena[node].leaf_count += 1;
            arena[node].included_count += included;
            parent = node;
        }

        let leaf_idx = arena.len();
        let mut leaf = ArenaNode::new(segments[segments.len() - 1], path);
        leaf.is_leaf = true;
        leaf.leaf_included = file.included;
        leaf.size_bytes = size;
        leaf.leaf_count = 1;
        leaf.included_count = included;
        arena.push(leaf);
        arena[parent].children.push(leaf_idx);
        index.insert(path.clone(), leaf_idx);
    }

    to_tree(&arena, 0)
}

fn to_tree(arena: &[ArenaNode], idx: usize) -> TreeNode {
    let node = &arena[idx];
    let mut children: Vec<TreeNode> = node
        .children
        .iter()
        .map(|&child| to_tree(arena, child))
        .collect();
    children.sort_by(|a, b| a.name.cmp(&b.name));

    TreeNode {
        name: node.name.clone(),
        path: node.path.clone(),
        size_bytes: node.size_bytes,
        included: node.state(),
        children,
    }
}

/// Flatten a tree into the parallel-array form in preorder.
pub fn flatten(root: &TreeNode) -> FlatTree {
    let mut flat = FlatTree {
        labels: Vec::new(),
        parents: Vec::new(),
        values: Vec::new(),
        ids: Vec::new(),
        included: Vec::new(),
    };
    flatten_into(root, "", &mut flat);
    flat
}

fn flatten_into(node: &TreeNode, parent_id: &str, flat: &mut FlatTree) {
    let id = if node.path.is_empty() {
        node.name.clone()
    } else {
        node.path.clone()
    };

    flat.labels.push(node.name.clone());
    flat.parents.push(parent_id.to_string());
    flat.values.push(node.size_bytes);
    flat.ids.push(id.clone());
    flat.included.push(node.included);

    for child in &node.children {
        flatten_into(child, &id, flat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::FileRecord;

    fn resolved(path: &str, size: u64, included: bool) -> ResolvedFile {
        ResolvedFile {
            record: FileRecord {
                relative_path: path.to_string(),
                size_bytes: size,
                fingerprint: format!("fp-{path}"),
            },
            included,
        }
    }

    fn child<'a>(node: &'a TreeNode, name: &str) -> &'a TreeNode {
        node.children
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no child {name:?} under {:?}", node.name))
    }

    fn assert_sums(node: &TreeNode) {
        if !node.children.is_empty() {
            let sum: u64 = node.children.iter().map(|c| c.size_bytes).sum();
            assert_eq!(node.size_bytes, sum, "sum mismatch at {:?}", node.path);
            for c in &node.children {
                assert_sums(c);
            }
        }
    }

    #[test]
    fn test_mixed_inclusion_makes_root_partial() {
        let files = vec![
            resolved("src/a.py", 10, true),
            resolved("src/b.py", 20, true),
            resolved("docs/readme.md", 5, false),
        ];
        let root = build(&files, "demo");

        assert_eq!(root.included, InclusionState::Partial);
        assert_eq!(root.size_bytes, 35);
        assert_eq!(child(&root, "src").included, InclusionState::Included);
        assert_eq!(child(&root, "src").size_bytes, 30);
        assert_eq!(child(&root, "docs").included, InclusionState::Excluded);
        assert_sums(&root);
    }

    #[test]
    fn test_leaves_never_partial() {
        let files = vec![resolved("a.txt", 1, true), resolved("b.txt", 1, false)];
        let root = build(&files, "demo");
        assert_eq!(child(&root, "a.txt").included, InclusionState::Included);
        assert_eq!(child(&root, "b.txt").included, InclusionState::Excluded);
    }

    #[test]
    fn test_size_counts_excluded_files() {
        let files = vec![
            resolved("src/a.py", 100, true),
            resolved("src/big.bin", 900, false),
        ];
        let root = build(&files, "demo");
        assert_eq!(child(&root, "src").size_bytes, 1000);
        assert_eq!(child(&root, "src").included, InclusionState::Partial);
    }

    #[test]
    fn test_all_excluded_directory() {
        let files = vec![
            resolved("docs/a.md", 1, false),
            resolved("docs/b.md", 1, false),
        ];
        let root = build(&files, "demo");
        assert_eq!(child(&root, "docs").included, InclusionState::Excluded);
        assert_eq!(root.included, InclusionState::Excluded);
    }

    #[test]
    fn test_deep_paths_merge_prefixes() {
        let files = vec![
            resolved("a/b/c/one.txt", 1, true),
            resolved("a/b/two.txt", 2, true),
        ];
        let root = build(&files, "demo");
        let b = child(child(&root, "a"), "b");
        assert_eq!(b.children.len(), 2);
        assert_eq!(b.size_bytes, 3);
        assert_sums(&root);
    }

    #[test]
    fn test_children_sorted_by_name() {
        let files = vec![
            resolved("z.txt", 1, true),
            resolved("a.txt", 1, true),
            resolved("m/x.txt", 1, true),
        ];
        let root = build(&files, "demo");
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "m", "z.txt"]);
    }

    #[test]
    fn test_flatten_parallel_arrays() {
        let files = vec![
            resolved("src/a.py", 10, true),
            resolved("docs/readme.md", 5, false),
        ];
        let root = build(&files, "demo");
        let flat = flatten(&root);

        let n = flat.ids.len();
        assert_eq!(flat.labels.len(), n);
        assert_eq!(flat.parents.len(), n);
        assert_eq!(flat.values.len(), n);
        assert_eq!(flat.included.len(), n);

        // Root first, parent empty, id is the root name
        assert_eq!(flat.ids[0], "demo");
        assert_eq!(flat.parents[0], "");

        // Every non-root parent id refers to an existing node id
        for parent in &flat.parents[1..] {
            assert!(flat.ids.contains(parent), "dangling parent {parent:?}");
        }

        let a_idx = flat.ids.iter().position(|id| id == "src/a.py").unwrap();
        assert_eq!(flat.parents[a_idx], "src");
        assert_eq!(flat.values[a_idx], 10);
        assert_eq!(flat.included[a_idx], InclusionState::Included);
    }

    #[test]
    fn test_empty_input_yields_bare_root() {
        let root = build(&[], "demo");
        assert!(root.children.is_empty());
        assert_eq!(root.size_bytes, 0);
    }
}
