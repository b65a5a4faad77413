//! A reference, in-process `AnalysisLockService` (spec §4.1 step 2, §5,
//! §9). Keyed exclusion is held in a `DashMap`, following the teacher's use
//! of `DashMap` for the tree-id cache and of a poll-and-sleep loop for
//! coordinating concurrent waiters (mirroring the model-loading state
//! machine's `Loading` branch). A production deployment would back the
//! same `AnalysisLockService` trait with a distributed advisory lock
//! (e.g. a database row lock); this implementation only provides
//! mutual exclusion within one process, which is sufficient for tests and
//! for a single-instance deployment.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use review_types::model::LockType;
use review_types::ports::{AnalysisLockService, LockHandle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LockKey {
  project_id: i64,
  branch_name: String,
  lock_type: LockType,
}

/// In-memory advisory lock table, one entry per currently-held key.
#[derive(Clone)]
pub struct InProcessLockService {
  held: Arc<DashMap<LockKey, String>>,
}

impl Default for InProcessLockService {
  fn default() -> Self {
    Self::new()
  }
}

impl InProcessLockService {
  pub fn new() -> Self {
    Self { held: Arc::new(DashMap::new()) }
  }

  /// Number of locks currently held, exposed for diagnostics/tests.
  pub fn held_count(&self) -> usize {
    self.held.len()
  }

  fn try_acquire(&self, key: &LockKey, holder_id: &str) -> bool {
    match self.held.entry(key.clone()) {
      Entry::Occupied(_) => false,
      Entry::Vacant(v) => {
        v.insert(holder_id.to_string());
        true
      }
    }
  }
}

#[async_trait]
impl AnalysisLockService for InProcessLockService {
  #[instrument(skip(self), fields(project_id, branch_name, holder_id))]
  async fn acquire_lock_with_wait(&self, project_id: i64, branch_name: &str, lock_type: LockType, holder_id: &str, max_wait: Duration, poll_interval: Duration) -> anyhow::Result<Option<LockHandle>> {
    let key = LockKey {
      project_id,
      branch_name: branch_name.to_string(),
      lock_type,
    };

    let deadline = Instant::now() + max_wait;

    loop {
      if self.try_acquire(&key, holder_id) {
        debug!(project_id, branch_name, holder_id, "acquired branch analysis lock");
        return Ok(Some(LockHandle {
          holder_id: holder_id.to_string(),
          acquired_at: Instant::now(),
        }));
      }

      if Instant::now() >= deadline {
        warn!(project_id, branch_name, "lock acquisition timed out; caller should retry later");
        return Ok(None);
      }

      tokio::time::sleep(poll_interval.min(deadline.saturating_duration_since(Instant::now()))).await;
    }
  }

  #[instrument(skip(self, handle), fields(project_id, branch_name, holder_id = %handle.holder_id))]
  async fn release_lock(&self, project_id: i64, branch_name: &str, lock_type: LockType, handle: LockHandle) -> anyhow::Result<()> {
    let key = LockKey {
      project_id,
      branch_name: branch_name.to_string(),
      lock_type,
    };

    match self.held.entry(key) {
      Entry::Occupied(entry) if entry.get() == &handle.holder_id => {
        entry.remove();
        debug!(project_id, branch_name, holder_id = %handle.holder_id, "released branch analysis lock");
      }
      Entry::Occupied(entry) => {
        warn!(project_id, branch_name, expected = %entry.get(), actual = %handle.holder_id, "refusing to release lock held by a different holder");
      }
      Entry::Vacant(_) => {
        warn!(project_id, branch_name, holder_id = %handle.holder_id, "release called on a lock that is not held");
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn second_acquirer_is_denied_until_release() {
    let service = InProcessLockService::new();

    let handle_a = service
      .acquire_lock_with_wait(1, "main", LockType::BranchAnalysis, "a", Duration::from_millis(200), Duration::from_millis(10))
      .await
      .unwrap()
      .expect("first acquisition should succeed");

    let denied = service.acquire_lock_with_wait(1, "main", LockType::BranchAnalysis, "b", Duration::from_millis(50), Duration::from_millis(10)).await.unwrap();
    assert!(denied.is_none());

    service.release_lock(1, "main", LockType::BranchAnalysis, handle_a).await.unwrap();

    let now_free = service.acquire_lock_with_wait(1, "main", LockType::BranchAnalysis, "c", Duration::from_millis(50), Duration::from_millis(10)).await.unwrap();
    assert!(now_free.is_some());
  }

  #[tokio::test]
  async fn release_with_a_stale_handle_does_not_free_the_current_holder() {
    let service = InProcessLockService::new();

    let handle_a = service
      .acquire_lock_with_wait(1, "main", LockType::BranchAnalysis, "a", Duration::from_millis(200), Duration::from_millis(10))
      .await
      .unwrap()
      .expect("first acquisition should succeed");

    // Simulate a caller presenting a handle for a holder that no longer
    // (or never did) hold this key.
    let stale_handle = LockHandle {
      holder_id: "someone-else".to_string(),
      acquired_at: handle_a.acquired_at,
    };
    service.release_lock(1, "main", LockType::BranchAnalysis, stale_handle).await.unwrap();

    let still_denied = service.acquire_lock_with_wait(1, "main", LockType::BranchAnalysis, "b", Duration::from_millis(50), Duration::from_millis(10)).await.unwrap();
    assert!(still_denied.is_none(), "lock must still be held by a, the stale release must be a no-op");

    service.release_lock(1, "main", LockType::BranchAnalysis, handle_a).await.unwrap();
    let now_free = service.acquire_lock_with_wait(1, "main", LockType::BranchAnalysis, "c", Duration::from_millis(50), Duration::from_millis(10)).await.unwrap();
    assert!(now_free.is_some());
  }

  #[tokio::test]
  async fn different_branches_do_not_contend() {
    let service = InProcessLockService::new();

    let a = service.acquire_lock_with_wait(1, "main", LockType::BranchAnalysis, "a", Duration::from_millis(50), Duration::from_millis(10)).await.unwrap();
    let b = service.acquire_lock_with_wait(1, "feature", LockType::BranchAnalysis, "b", Duration::from_millis(50), Duration::from_millis(10)).await.unwrap();

    assert!(a.is_some());
    assert!(b.is_some());
  }
}
