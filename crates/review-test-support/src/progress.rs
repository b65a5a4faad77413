use async_trait::async_trait;
use review_types::ports::ProgressSink;
use review_types::requests::ProgressEvent;
use std::sync::Mutex;

/// Records every event it receives, in order, for assertion in tests.
#[derive(Default)]
pub struct RecordingProgressSink {
  events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgressSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn events(&self) -> Vec<ProgressEvent> {
    self.events.lock().unwrap().clone()
  }
}

#[async_trait]
impl ProgressSink for RecordingProgressSink {
  async fn send(&self, event: ProgressEvent) {
    self.events.lock().unwrap().push(event);
  }
}
