use async_trait::async_trait;
use review_types::model::BranchFile;
use review_types::ports::BranchFileRepository;
use std::collections::HashMap;
use std::sync::Mutex;

type Key = (i64, String, String);

#[derive(Default)]
pub struct FakeBranchFileRepository {
  files: Mutex<HashMap<Key, BranchFile>>,
}

impl FakeBranchFileRepository {
  pub fn new() -> Self {
    Self::default()
  }

  fn key(project_id: i64, branch_name: &str, file_path: &str) -> Key {
    (project_id, branch_name.to_string(), file_path.to_string())
  }

  pub fn all_for_branch(&self, project_id: i64, branch_name: &str) -> Vec<BranchFile> {
    self.files.lock().unwrap().values().filter(|f| f.project_id == project_id && f.branch_name == branch_name).cloned().collect()
  }
}

#[async_trait]
impl BranchFileRepository for FakeBranchFileRepository {
  async fn find(&self, project_id: i64, branch_name: &str, file_path: &str) -> anyhow::Result<Option<BranchFile>> {
    Ok(self.files.lock().unwrap().get(&Self::key(project_id, branch_name, file_path)).cloned())
  }

  async fn upsert(&self, file: &BranchFile) -> anyhow::Result<()> {
    let key = Self::key(file.project_id, &file.branch_name, &file.file_path);
    self.files.lock().unwrap().insert(key, file.clone());
    Ok(())
  }

  async fn delete(&self, project_id: i64, branch_name: &str, file_path: &str) -> anyhow::Result<()> {
    self.files.lock().unwrap().remove(&Self::key(project_id, branch_name, file_path));
    Ok(())
  }
}
