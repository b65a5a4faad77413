//! A bounded progress buffer (spec §9: "if buffering is used, document the
//! bound"). Holds at most `capacity` events, dropping the oldest when full,
//! so a slow or absent consumer can never back-pressure `process`.

use async_trait::async_trait;
use review_types::ports::ProgressSink;
use review_types::requests::ProgressEvent;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::warn;

const DEFAULT_CAPACITY: usize = 256;

pub struct BufferedProgressSink {
  capacity: usize,
  events: Mutex<VecDeque<ProgressEvent>>,
}

impl Default for BufferedProgressSink {
  fn default() -> Self {
    Self::new(DEFAULT_CAPACITY)
  }
}

impl BufferedProgressSink {
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      events: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
    }
  }

  /// Drains all currently buffered events in arrival order.
  pub fn drain(&self) -> Vec<ProgressEvent> {
    self.events.lock().unwrap().drain(..).collect()
  }

  pub fn len(&self) -> usize {
    self.events.lock().unwrap().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl ProgressSink for BufferedProgressSink {
  async fn send(&self, event: ProgressEvent) {
    let mut events = self.events.lock().unwrap();
    if events.len() >= self.capacity {
      events.pop_front();
      warn!(capacity = self.capacity, "progress buffer full; dropping oldest event");
    }
    events.push_back(event);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use review_types::requests::Stage;

  #[tokio::test]
  async fn drops_oldest_once_capacity_is_reached() {
    let sink = BufferedProgressSink::new(2);
    sink.send(ProgressEvent::new(Stage::Init, "first")).await;
    sink.send(ProgressEvent::new(Stage::Diff, "second")).await;
    sink.send(ProgressEvent::new(Stage::Sync, "third")).await;

    let drained = sink.drain();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].message, "second");
    assert_eq!(drained[1].message, "third");
  }

  #[tokio::test]
  async fn drain_empties_the_buffer() {
    let sink = BufferedProgressSink::new(4);
    sink.send(ProgressEvent::new(Stage::Init, "only")).await;
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.drain().len(), 1);
    assert!(sink.is_empty());
  }
}
