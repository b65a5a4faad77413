use async_trait::async_trait;
use review_types::ports::{AiAnalysisClient, ProgressSink};
use review_types::requests::AiAnalysisRequest;
use std::sync::Mutex;

/// Returns a fixed response (or a configured error) and records every
/// request it was called with, so tests can assert the AI was invoked at
/// most once per `process()` run.
pub struct FakeAiAnalysisClient {
  response: serde_json::Value,
  fail: bool,
  calls: Mutex<Vec<AiAnalysisRequest>>,
}

impl FakeAiAnalysisClient {
  pub fn with_response(response: serde_json::Value) -> Self {
    Self { response, fail: false, calls: Mutex::new(Vec::new()) }
  }

  pub fn failing() -> Self {
    Self {
      response: serde_json::Value::Null,
      fail: true,
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }
}

#[async_trait]
impl AiAnalysisClient for FakeAiAnalysisClient {
  async fn perform_analysis(&self, request: &AiAnalysisRequest, _progress: &dyn ProgressSink) -> anyhow::Result<serde_json::Value> {
    self.calls.lock().unwrap().push(request.clone());
    if self.fail {
      anyhow::bail!("simulated AI analysis failure");
    }
    Ok(self.response.clone())
  }
}
