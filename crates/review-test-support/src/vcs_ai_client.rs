use review_types::model::Project;
use review_types::ports::VcsAiClient;
use review_types::requests::{AiAnalysisRequest, CandidateIssue, ProcessRequest};

/// Builds an `AiAnalysisRequest` straight from the project's configured
/// token ceiling, with no provider-specific prompt shaping.
pub struct FakeVcsAiClient {
  pub raw_diff: String,
}

impl FakeVcsAiClient {
  pub fn new(raw_diff: impl Into<String>) -> Self {
    Self { raw_diff: raw_diff.into() }
  }
}

impl VcsAiClient for FakeVcsAiClient {
  fn build_ai_analysis_request(&self, project: &Project, _process_request: &ProcessRequest, candidates: Vec<CandidateIssue>) -> AiAnalysisRequest {
    let provider = project.vcs.as_ref().map(|v| v.provider).unwrap_or(review_types::model::ProviderTag::BitbucketCloud);
    let token_ceiling = project.ai.as_ref().map(|ai| ai.token_limitation).unwrap_or(0);
    let provider_model_id = project.ai.as_ref().map(|ai| ai.provider_model_id.clone()).unwrap_or_default();
    let api_key = project.ai.as_ref().map(|ai| ai.api_key.clone()).unwrap_or_default();

    AiAnalysisRequest {
      raw_diff: self.raw_diff.clone(),
      candidates,
      project_id: project.project_id,
      workspace_name: project.workspace_name.clone(),
      namespace: project.namespace.clone(),
      token_ceiling,
      provider,
      provider_model_id,
      api_key,
    }
  }
}
