use crate::code_analysis_issue_repo::FakeCodeAnalysisIssueRepository;
use async_trait::async_trait;
use review_types::model::BranchIssue;
use review_types::ports::BranchIssueRepository;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// `BranchIssue` doesn't carry a file path, so `open_for_file` is derived by
/// cross-referencing each stored issue against `code_analysis_issues` for
/// its path rather than from a separately-maintained index. This keeps the
/// fake correct when `insert_if_absent` creates a `BranchIssue` and the same
/// `process` call later reads it back via `open_for_file`, without relying
/// on test setup to populate a parallel structure by hand.
pub struct FakeBranchIssueRepository {
  issues: Mutex<HashMap<(i64, i64), BranchIssue>>,
  code_analysis_issues: Arc<FakeCodeAnalysisIssueRepository>,
}

impl FakeBranchIssueRepository {
  pub fn new(code_analysis_issues: Arc<FakeCodeAnalysisIssueRepository>) -> Self {
    Self {
      issues: Mutex::new(HashMap::new()),
      code_analysis_issues,
    }
  }

  pub fn seed(&self, issue: BranchIssue) {
    self.issues.lock().unwrap().insert((issue.branch_id, issue.code_analysis_issue_id), issue);
  }
}

#[async_trait]
impl BranchIssueRepository for FakeBranchIssueRepository {
  async fn find(&self, branch_id: i64, code_analysis_issue_id: i64) -> anyhow::Result<Option<BranchIssue>> {
    Ok(self.issues.lock().unwrap().get(&(branch_id, code_analysis_issue_id)).cloned())
  }

  async fn open_for_file(&self, branch_id: i64, file_path: &str) -> anyhow::Result<Vec<BranchIssue>> {
    let candidates: Vec<BranchIssue> = self.issues.lock().unwrap().values().filter(|issue| issue.branch_id == branch_id).cloned().collect();

    Ok(
      candidates
        .into_iter()
        .filter(|issue| self.code_analysis_issues.get(issue.code_analysis_issue_id).is_some_and(|code_analysis_issue| code_analysis_issue.file_path == file_path))
        .collect(),
    )
  }

  async fn insert_if_absent(&self, issue: &BranchIssue) -> anyhow::Result<()> {
    let mut issues = self.issues.lock().unwrap();
    issues.entry((issue.branch_id, issue.code_analysis_issue_id)).or_insert_with(|| issue.clone());
    Ok(())
  }

  async fn save(&self, issue: &BranchIssue) -> anyhow::Result<()> {
    self.issues.lock().unwrap().insert((issue.branch_id, issue.code_analysis_issue_id), issue.clone());
    Ok(())
  }

  async fn count_unresolved(&self, branch_id: i64) -> anyhow::Result<Vec<BranchIssue>> {
    Ok(self.issues.lock().unwrap().values().filter(|i| i.branch_id == branch_id && !i.resolved).cloned().collect())
  }
}
