pub mod scope;

use serde::{Deserialize, Serialize};

use crate::model::TestCase;

// ============================================================================
// Data model
// ============================================================================

/// Folder kinds, in strict nesting order: environment folders sit at the
/// root, deployment-date folders under them, feature folders below those.
/// `TestCase` marks display-only leaves, not folder rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
    Environment,
    DeploymentDate,
    Feature,
    TestCase,
}

impl FolderType {
    pub fn as_str(self) -> &'static str {
        match self {
            FolderType::Environment => "environment",
            FolderType::DeploymentDate => "deployment_date",
            FolderType::Feature => "feature",
            FolderType::TestCase => "test_case",
        }
    }

    pub fn parse(s: &str) -> Option<FolderType> {
        match s {
            "environment" => Some(FolderType::Environment),
            "deployment_date" => Some(FolderType::DeploymentDate),
            "feature" => Some(FolderType::Feature),
            "test_case" => Some(FolderType::TestCase),
            _ => None,
        }
    }

    /// Folder type implied by nesting depth. The stored `folder_type`
    /// column is advisory; the tree derives the effective type from where
    /// a folder actually sits, as the console expects.
    pub fn for_depth(depth: usize) -> FolderType {
        match depth {
            0 => FolderType::Environment,
            1 => FolderType::DeploymentDate,
            _ => FolderType::Feature,
        }
    }

    pub fn allows_child(self, child: FolderType) -> bool {
        matches!(
            (self, child),
            (FolderType::Environment, FolderType::DeploymentDate)
                | (FolderType::DeploymentDate, FolderType::Feature)
                | (FolderType::Feature, FolderType::TestCase)
        )
    }
}

/// A flat folder row as stored; the tree is assembled from these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRow {
    pub id: i64,
    pub name: String,
    pub folder_type: String,
    pub environment: Option<String>,
    pub deployment_date: Option<String>,
    pub parent_folder_id: Option<i64>,
    pub created_at: String,
}

/// One node of the assembled folder tree. Test-case leaves reuse this
/// shape with `node_type = TestCase` and a `status` for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: FolderType,
    pub parent_folder_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub children: Vec<FolderNode>,
}

// ============================================================================
// Tree assembly
// ============================================================================

/// Build the folder tree from flat rows. Node types are derived from
/// depth, so a row whose stored type drifted still lands where its
/// parentage puts it. Rebuilt wholesale per request; never mutated.
pub fn build_tree(folders: &[FolderRow]) -> Vec<FolderNode> {
    build_subtree(folders, None, 0, &[])
}

/// Same tree with test-case leaves attached under their feature folders.
pub fn build_tree_with_cases(folders: &[FolderRow], cases: &[TestCase]) -> Vec<FolderNode> {
    build_subtree(folders, None, 0, cases)
}

fn build_subtree(
    folders: &[FolderRow],
    parent_id: Option<i64>,
    depth: usize,
    cases: &[TestCase],
) -> Vec<FolderNode> {
    folders
        .iter()
        .filter(|f| f.parent_folder_id == parent_id)
        .map(|f| {
            let node_type = FolderType::for_depth(depth);
            let mut children = build_subtree(folders, Some(f.id), depth + 1, cases);
            if node_type == FolderType::Feature {
                children.extend(case_leaves(f.id, cases));
            }
            FolderNode {
                id: f.id,
                name: f.name.clone(),
                node_type,
                parent_folder_id: f.parent_folder_id,
                environment: f.environment.clone(),
                deployment_date: f.deployment_date.clone(),
                status: None,
                children,
            }
        })
        .collect()
}

fn case_leaves(folder_id: i64, cases: &[TestCase]) -> Vec<FolderNode> {
    cases
        .iter()
        .filter(|c| c.folder_id == Some(folder_id))
        .map(|c| FolderNode {
            id: c.id,
            name: leaf_label(c),
            node_type: FolderType::TestCase,
            parent_folder_id: Some(folder_id),
            environment: None,
            deployment_date: None,
            status: Some(c.result_status.clone()),
            children: Vec::new(),
        })
        .collect()
}

fn leaf_label(case: &TestCase) -> String {
    if case.sub_category.is_empty() {
        case.main_category.clone()
    } else {
        format!("{} - {}", case.main_category, case.sub_category)
    }
}
