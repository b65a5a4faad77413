use async_trait::async_trait;
use review_types::model::Project;
use review_types::ports::{ProgressSink, RagOperations};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeRagOperations {
  pub index_ready: bool,
  pub fail_incremental_update: bool,
  pub fail_full_update: bool,
  incremental_calls: Mutex<Vec<(String, String)>>,
  full_update_calls: Mutex<Vec<String>>,
}

impl FakeRagOperations {
  pub fn new(index_ready: bool) -> Self {
    Self { index_ready, ..Self::default() }
  }

  pub fn failing_incremental_update(mut self) -> Self {
    self.fail_incremental_update = true;
    self
  }

  pub fn failing_full_update(mut self) -> Self {
    self.fail_full_update = true;
    self
  }

  pub fn incremental_calls(&self) -> Vec<(String, String)> {
    self.incremental_calls.lock().unwrap().clone()
  }

  pub fn full_update_calls(&self) -> Vec<String> {
    self.full_update_calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl RagOperations for FakeRagOperations {
  fn is_rag_enabled(&self, project: &Project) -> bool {
    project.rag_enabled
  }

  async fn is_rag_index_ready(&self, _project: &Project) -> anyhow::Result<bool> {
    Ok(self.index_ready)
  }

  fn get_base_branch(&self, project: &Project) -> String {
    project.base_branch.clone()
  }

  async fn trigger_incremental_update(&self, _project: &Project, branch_name: &str, commit_hash: &str, _raw_diff: &str, _progress: &dyn ProgressSink) -> anyhow::Result<()> {
    self.incremental_calls.lock().unwrap().push((branch_name.to_string(), commit_hash.to_string()));
    if self.fail_incremental_update {
      anyhow::bail!("simulated incremental rag update failure");
    }
    Ok(())
  }

  async fn update_branch_index(&self, _project: &Project, branch_name: &str, _progress: &dyn ProgressSink) -> anyhow::Result<()> {
    self.full_update_calls.lock().unwrap().push(branch_name.to_string());
    if self.fail_full_update {
      anyhow::bail!("simulated full rag update failure");
    }
    Ok(())
  }
}
