use async_trait::async_trait;
use review_types::ports::VcsOperations;
use std::collections::HashMap;
use std::sync::Mutex;

/// Each tier can be independently configured to succeed with a fixed diff
/// or fail, so tests can exercise the three-tier fallback (spec §4.2)
/// without a real VCS.
#[derive(Default)]
pub struct FakeVcsOperations {
  pub range_diff: Option<String>,
  pub fail_range_diff: bool,
  pub pr_diff: Option<String>,
  pub fail_pr_diff: bool,
  pub commit_diff: Option<String>,
  pub fail_commit_diff: bool,
  pub pr_for_commit: Option<i64>,
  pub existing_files: Mutex<HashMap<String, bool>>,
}

impl FakeVcsOperations {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_file_exists(&self, path: impl Into<String>, exists: bool) {
    self.existing_files.lock().unwrap().insert(path.into(), exists);
  }
}

#[async_trait]
impl VcsOperations for FakeVcsOperations {
  async fn get_commit_range_diff(&self, _workspace: &str, _repo_slug: &str, _base_sha: &str, _head_sha: &str) -> anyhow::Result<String> {
    if self.fail_range_diff {
      anyhow::bail!("simulated range-diff failure");
    }
    Ok(self.range_diff.clone().unwrap_or_default())
  }

  async fn get_pull_request_diff(&self, _workspace: &str, _repo_slug: &str, _pr_number: i64) -> anyhow::Result<String> {
    if self.fail_pr_diff {
      anyhow::bail!("simulated pull request diff failure");
    }
    Ok(self.pr_diff.clone().unwrap_or_default())
  }

  async fn get_commit_diff(&self, _workspace: &str, _repo_slug: &str, _sha: &str) -> anyhow::Result<String> {
    if self.fail_commit_diff {
      anyhow::bail!("simulated commit-diff failure");
    }
    Ok(self.commit_diff.clone().unwrap_or_default())
  }

  async fn find_pull_request_for_commit(&self, _workspace: &str, _repo_slug: &str, _sha: &str) -> anyhow::Result<Option<i64>> {
    Ok(self.pr_for_commit)
  }

  async fn check_file_exists_in_branch(&self, _workspace: &str, _repo_slug: &str, _branch: &str, path: &str) -> anyhow::Result<bool> {
    Ok(self.existing_files.lock().unwrap().get(path).copied().unwrap_or(true))
  }
}
