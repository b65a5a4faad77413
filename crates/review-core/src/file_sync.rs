//! File-state synchronizer (spec §4.4). Runs before the reconciler so it
//! sees a complete `BranchIssue` candidate set (P5, the deleted-file skip).

use indexmap::IndexSet;
use review_types::model::BranchFile;
use review_types::ports::{BranchFileRepository, BranchIssueRepository, CodeAnalysisIssueRepository, VcsOperations};
use tracing::{debug, instrument};

#[instrument(skip(branch_files, branch_issues, code_analysis_issues, vcs, changed_files), fields(project_id, branch_id, branch_name, file_count = changed_files.len()))]
#[allow(clippy::too_many_arguments)]
pub async fn synchronize_files(
  branch_files: &dyn BranchFileRepository,
  branch_issues: &dyn BranchIssueRepository,
  code_analysis_issues: &dyn CodeAnalysisIssueRepository,
  vcs: &dyn VcsOperations,
  workspace: &str,
  repo_slug: &str,
  project_id: i64,
  branch_id: i64,
  branch_name: &str,
  changed_files: &IndexSet<String>,
) -> anyhow::Result<()> {
  for file_path in changed_files {
    let exists = vcs.check_file_exists_in_branch(workspace, repo_slug, branch_name, file_path).await?;

    if !exists {
      debug!(file_path, "file no longer exists on branch; skipping issue mapping");
      branch_files.delete(project_id, branch_name, file_path).await?;
      continue;
    }

    let persisted_issues = code_analysis_issues.find_by_project_and_path(project_id, file_path).await?;
    let mapped_issue_ids: Vec<i64> = persisted_issues.into_iter().filter(|issue| issue.branch_name == branch_name).map(|issue| issue.id).collect();

    for issue_id in &mapped_issue_ids {
      branch_issues.insert_if_absent(&review_types::model::BranchIssue::new_open(branch_id, *issue_id)).await?;
    }

    let mapped_count = mapped_issue_ids.len() as u32;
    match branch_files.find(project_id, branch_name, file_path).await? {
      None => {
        if mapped_count > 0 {
          branch_files
            .upsert(&BranchFile {
              project_id,
              branch_name: branch_name.to_string(),
              file_path: file_path.clone(),
              issue_count: mapped_count,
            })
            .await?;
        }
      }
      Some(existing) if existing.issue_count != mapped_count => {
        branch_files
          .upsert(&BranchFile {
            issue_count: mapped_count,
            ..existing
          })
          .await?;
      }
      Some(_) => {}
    }
  }

  Ok(())
}
