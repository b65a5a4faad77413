use async_trait::async_trait;
use review_types::model::Project;
use review_types::ports::ProjectRepository;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeProjectRepository {
  projects: Mutex<HashMap<i64, Project>>,
}

impl FakeProjectRepository {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn seed(&self, project: Project) {
    self.projects.lock().unwrap().insert(project.project_id, project);
  }
}

#[async_trait]
impl ProjectRepository for FakeProjectRepository {
  async fn find(&self, project_id: i64) -> anyhow::Result<Option<Project>> {
    Ok(self.projects.lock().unwrap().get(&project_id).cloned())
  }
}
