use async_trait::async_trait;
use review_types::model::Branch;
use review_types::ports::BranchRepository;
use std::collections::HashMap;
use std::sync::Mutex;

/// Keyed by `(project_id, branch_name)`; `upsert` assigns a fresh id the
/// first time a key is seen and reuses it thereafter, matching a typical
/// unique-constraint-backed table.
#[derive(Default)]
pub struct FakeBranchRepository {
  branches: Mutex<HashMap<(i64, String), Branch>>,
  next_id: Mutex<i64>,
}

impl FakeBranchRepository {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn seed(&self, branch: Branch) {
    let key = (branch.project_id, branch.branch_name.clone());
    let mut next_id = self.next_id.lock().unwrap();
    *next_id = (*next_id).max(branch.id + 1);
    self.branches.lock().unwrap().insert(key, branch);
  }
}

#[async_trait]
impl BranchRepository for FakeBranchRepository {
  async fn find_by_project_and_name(&self, project_id: i64, branch_name: &str) -> anyhow::Result<Option<Branch>> {
    Ok(self.branches.lock().unwrap().get(&(project_id, branch_name.to_string())).cloned())
  }

  async fn upsert(&self, branch: &Branch) -> anyhow::Result<i64> {
    let key = (branch.project_id, branch.branch_name.clone());
    let mut branches = self.branches.lock().unwrap();

    let id = match branches.get(&key) {
      Some(existing) => existing.id,
      None => {
        let mut next_id = self.next_id.lock().unwrap();
        let assigned = *next_id;
        *next_id += 1;
        assigned
      }
    };

    let mut stored = branch.clone();
    stored.id = id;
    branches.insert(key, stored);
    Ok(id)
  }
}
