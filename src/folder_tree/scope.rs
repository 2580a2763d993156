//! Folder-scoped filtering: resolving which folder ids a tree selection
//! covers, and applying that scope to the flat test-case collection.
//!
//! These are pure functions over immutable snapshots. They never fail;
//! degenerate selections degrade to an empty or unfiltered result so the
//! console keeps rendering (prefer showing too much over losing the view).

use std::collections::HashSet;

use super::{FolderNode, FolderType};
use crate::model::TestCase;

/// Depth-first pre-order search for the first node with the given id.
pub fn find_folder_in_tree(roots: &[FolderNode], id: i64) -> Option<&FolderNode> {
    for node in roots {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_folder_in_tree(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Folder ids covered by selecting an environment: every deployment-date
/// child plus each of their feature children. The environment's own id is
/// excluded since environment folders hold no test cases directly.
/// Missing node or non-environment id resolves to the empty set.
pub fn resolve_environment_scope(roots: &[FolderNode], env_id: i64) -> HashSet<i64> {
    let mut scope = HashSet::new();
    let Some(node) = find_folder_in_tree(roots, env_id) else {
        return scope;
    };
    if node.node_type != FolderType::Environment {
        return scope;
    }
    for child in &node.children {
        if child.node_type != FolderType::DeploymentDate {
            continue;
        }
        scope.insert(child.id);
        for grandchild in &child.children {
            if grandchild.node_type == FolderType::Feature {
                scope.insert(grandchild.id);
            }
        }
    }
    scope
}

/// Folder ids covered by selecting a deployment date: the folder itself
/// (cases may be filed directly under it) plus its feature children.
/// Missing node or non-deployment id resolves to the empty set.
pub fn resolve_deployment_scope(roots: &[FolderNode], dep_id: i64) -> HashSet<i64> {
    let mut scope = HashSet::new();
    let Some(node) = find_folder_in_tree(roots, dep_id) else {
        return scope;
    };
    if node.node_type != FolderType::DeploymentDate {
        return scope;
    }
    scope.insert(node.id);
    for child in &node.children {
        if child.node_type == FolderType::Feature {
            scope.insert(child.id);
        }
    }
    scope
}

/// Scope for any selectable node. `None` means the selection cannot be
/// scoped (id vanished from the tree, or a test-case leaf was selected)
/// and the caller should fall open to the unfiltered collection.
pub fn resolve_selection_scope(roots: &[FolderNode], id: i64) -> Option<HashSet<i64>> {
    match find_folder_in_tree(roots, id).map(|n| n.node_type) {
        Some(FolderType::Environment) => Some(resolve_environment_scope(roots, id)),
        Some(FolderType::DeploymentDate) => Some(resolve_deployment_scope(roots, id)),
        Some(FolderType::Feature) => Some(HashSet::from([id])),
        Some(FolderType::TestCase) | None => None,
    }
}

/// Restrict `cases` to the selected folder's scope, preserving input
/// order. No selection, a vanished id, or a leaf selection returns the
/// collection unchanged.
pub fn filter_test_cases(
    cases: Vec<TestCase>,
    selected_folder_id: Option<i64>,
    roots: &[FolderNode],
) -> Vec<TestCase> {
    let Some(selected) = selected_folder_id else {
        return cases;
    };
    let Some(scope) = resolve_selection_scope(roots, selected) else {
        return cases;
    };
    cases
        .into_iter()
        .filter(|c| c.folder_id.is_some_and(|id| scope.contains(&id)))
        .collect()
}
