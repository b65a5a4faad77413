//! Step A of spec §4.3: candidate gathering with the branch-specific filter.

use indexmap::{IndexMap, IndexSet};
use review_types::model::{BranchIssue, CodeAnalysisIssue};
use review_types::ports::{BranchIssueRepository, CodeAnalysisIssueRepository};
use review_types::requests::CandidateIssue;
use tracing::{debug, instrument};

/// A still-open `BranchIssue` paired with the `CodeAnalysisIssue` it
/// tracks, kept together so verdict application doesn't need a second
/// lookup.
#[derive(Debug, Clone)]
pub struct Candidate {
  pub branch_issue: BranchIssue,
  pub code_analysis_issue: CodeAnalysisIssue,
}

/// Gathers still-open `BranchIssue`s for every changed file, unions them,
/// and retains only those whose underlying `CodeAnalysisIssue` was first
/// recorded on `branch_name` (P6, the branch-specific filter).
#[instrument(skip(branch_issues, code_analysis_issues, changed_files), fields(branch_id, branch_name, file_count = changed_files.len()))]
pub async fn gather_candidates(branch_issues: &dyn BranchIssueRepository, code_analysis_issues: &dyn CodeAnalysisIssueRepository, branch_id: i64, branch_name: &str, changed_files: &IndexSet<String>) -> anyhow::Result<Vec<Candidate>> {
  // Union by code_analysis_issue_id; a file path uniquely determines the
  // issue's origin, so no file contributes the same issue twice, but we
  // dedupe defensively in case a repository implementation is looser.
  let mut by_issue_id: IndexMap<i64, BranchIssue> = IndexMap::new();

  for file_path in changed_files {
    let open = branch_issues.open_for_file(branch_id, file_path).await?;
    for issue in open {
      if issue.resolved {
        continue;
      }
      by_issue_id.entry(issue.code_analysis_issue_id).or_insert(issue);
    }
  }

  let mut candidates = Vec::with_capacity(by_issue_id.len());

  for (issue_id, branch_issue) in by_issue_id {
    let Some(code_analysis_issue) = code_analysis_issues.find_by_id(issue_id).await? else {
      debug!(issue_id, "candidate BranchIssue references a missing CodeAnalysisIssue; skipping");
      continue;
    };

    if code_analysis_issue.branch_name != branch_name {
      debug!(issue_id, origin_branch = %code_analysis_issue.branch_name, target_branch = branch_name, "dropping candidate recorded on a different branch");
      continue;
    }

    candidates.push(Candidate { branch_issue, code_analysis_issue });
  }

  debug!(candidate_count = candidates.len(), "gathered reconciliation candidates");

  Ok(candidates)
}

/// Converts gathered candidates into the shape the AI request needs.
pub fn to_candidate_issues(candidates: &[Candidate]) -> Vec<CandidateIssue> {
  candidates
    .iter()
    .map(|c| CandidateIssue {
      issue_id: c.code_analysis_issue.id,
      file_path: c.code_analysis_issue.file_path.clone(),
      line_number: c.code_analysis_issue.line_number,
      severity: c.code_analysis_issue.severity,
      category: c.code_analysis_issue.category.clone(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use review_test_support::{FakeBranchIssueRepository, FakeCodeAnalysisIssueRepository};
  use review_types::model::{BranchIssue, CodeAnalysisIssue, Severity};
  use std::sync::Arc;

  fn code_analysis_issue(id: i64, branch_name: &str, file_path: &str) -> CodeAnalysisIssue {
    CodeAnalysisIssue {
      id,
      project_id: 1,
      file_path: file_path.into(),
      line_number: 1,
      severity: Severity::Low,
      category: "style".into(),
      resolved: false,
      branch_name: branch_name.into(),
      commit_hash: "deadbeef".into(),
      resolved_in_commit_hash: None,
      resolved_in_pr_number: None,
      resolved_description: None,
    }
  }

  #[tokio::test]
  async fn unions_candidates_across_changed_files() {
    let code_analysis_issues = Arc::new(FakeCodeAnalysisIssueRepository::new());
    let branch_issues = FakeBranchIssueRepository::new(code_analysis_issues.clone());

    code_analysis_issues.seed(code_analysis_issue(1, "feature/x", "a.rs"));
    code_analysis_issues.seed(code_analysis_issue(2, "feature/x", "b.rs"));
    branch_issues.seed(BranchIssue::new_open(1, 1));
    branch_issues.seed(BranchIssue::new_open(1, 2));

    let mut changed_files = IndexSet::new();
    changed_files.insert("a.rs".to_string());
    changed_files.insert("b.rs".to_string());

    let candidates = gather_candidates(&branch_issues, &code_analysis_issues, 1, "feature/x", &changed_files).await.unwrap();

    assert_eq!(candidates.len(), 2);
  }

  #[tokio::test]
  async fn drops_candidates_from_a_different_branch() {
    let code_analysis_issues = Arc::new(FakeCodeAnalysisIssueRepository::new());
    let branch_issues = FakeBranchIssueRepository::new(code_analysis_issues.clone());

    code_analysis_issues.seed(code_analysis_issue(2, "other-branch", "a.rs"));
    branch_issues.seed(BranchIssue::new_open(1, 2));

    let mut changed_files = IndexSet::new();
    changed_files.insert("a.rs".to_string());

    let candidates = gather_candidates(&branch_issues, &code_analysis_issues, 1, "feature/x", &changed_files).await.unwrap();

    assert!(candidates.is_empty());
  }

  #[tokio::test]
  async fn already_resolved_branch_issues_are_not_gathered() {
    let code_analysis_issues = Arc::new(FakeCodeAnalysisIssueRepository::new());
    let branch_issues = FakeBranchIssueRepository::new(code_analysis_issues.clone());

    code_analysis_issues.seed(code_analysis_issue(3, "feature/x", "a.rs"));
    let mut resolved = BranchIssue::new_open(1, 3);
    resolved.resolved = true;
    branch_issues.seed(resolved);

    let mut changed_files = IndexSet::new();
    changed_files.insert("a.rs".to_string());

    let candidates = gather_candidates(&branch_issues, &code_analysis_issues, 1, "feature/x", &changed_files).await.unwrap();

    assert!(candidates.is_empty());
  }

  #[tokio::test]
  async fn a_branch_issue_created_by_file_sync_is_immediately_visible_to_gather() {
    // Exercises spec §4.4's ordering guarantee end-to-end through the fakes:
    // a `BranchIssue` created by `insert_if_absent` (as `synchronize_files`
    // does) must be found by `open_for_file` within the same `process` call,
    // without any manual test-side indexing step.
    let code_analysis_issues = Arc::new(FakeCodeAnalysisIssueRepository::new());
    let branch_issues = FakeBranchIssueRepository::new(code_analysis_issues.clone());

    code_analysis_issues.seed(code_analysis_issue(9, "feature/x", "a.rs"));
    branch_issues.insert_if_absent(&BranchIssue::new_open(1, 9)).await.unwrap();

    let mut changed_files = IndexSet::new();
    changed_files.insert("a.rs".to_string());

    let candidates = gather_candidates(&branch_issues, &code_analysis_issues, 1, "feature/x", &changed_files).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].code_analysis_issue.id, 9);
  }
}
