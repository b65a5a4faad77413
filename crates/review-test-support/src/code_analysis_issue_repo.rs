use async_trait::async_trait;
use review_types::model::CodeAnalysisIssue;
use review_types::ports::CodeAnalysisIssueRepository;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeCodeAnalysisIssueRepository {
  issues: Mutex<HashMap<i64, CodeAnalysisIssue>>,
}

impl FakeCodeAnalysisIssueRepository {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn seed(&self, issue: CodeAnalysisIssue) {
    self.issues.lock().unwrap().insert(issue.id, issue);
  }

  pub fn get(&self, id: i64) -> Option<CodeAnalysisIssue> {
    self.issues.lock().unwrap().get(&id).cloned()
  }
}

#[async_trait]
impl CodeAnalysisIssueRepository for FakeCodeAnalysisIssueRepository {
  async fn find_by_project_and_path(&self, project_id: i64, file_path: &str) -> anyhow::Result<Vec<CodeAnalysisIssue>> {
    Ok(self.issues.lock().unwrap().values().filter(|i| i.project_id == project_id && i.file_path == file_path).cloned().collect())
  }

  async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<CodeAnalysisIssue>> {
    Ok(self.issues.lock().unwrap().get(&id).cloned())
  }

  async fn mark_resolved(&self, id: i64, commit_hash: &str, pr_number: Option<i64>, description: Option<&str>) -> anyhow::Result<()> {
    if let Some(issue) = self.issues.lock().unwrap().get_mut(&id) {
      issue.resolved = true;
      issue.resolved_in_commit_hash = Some(commit_hash.to_string());
      issue.resolved_in_pr_number = pr_number;
      issue.resolved_description = description.map(str::to_string);
    }
    Ok(())
  }
}
