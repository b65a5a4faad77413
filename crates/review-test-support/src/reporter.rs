use async_trait::async_trait;
use review_types::model::{CodeAnalysisIssue, Project};
use review_types::ports::Reporter;
use review_types::requests::ProcessRequest;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeReporter {
  summaries: Mutex<Vec<String>>,
  annotation_counts: Mutex<Vec<usize>>,
}

impl FakeReporter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn summaries(&self) -> Vec<String> {
    self.summaries.lock().unwrap().clone()
  }

  pub fn annotation_counts(&self) -> Vec<usize> {
    self.annotation_counts.lock().unwrap().clone()
  }
}

#[async_trait]
impl Reporter for FakeReporter {
  async fn post_summary_comment(&self, _project: &Project, _process_request: &ProcessRequest, summary: &str) -> anyhow::Result<()> {
    self.summaries.lock().unwrap().push(summary.to_string());
    Ok(())
  }

  async fn post_inline_annotations(&self, _project: &Project, _process_request: &ProcessRequest, issues: &[CodeAnalysisIssue]) -> anyhow::Result<()> {
    self.annotation_counts.lock().unwrap().push(issues.len());
    Ok(())
  }
}
