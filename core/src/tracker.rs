// core/src/tracker.rs

//! Remembers which redemption a coupon code produced, so an abandoned
//! checkout can roll it back. Nothing here survives a restart.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::Result;

/// What to do when a rollback is requested for a code with no recorded redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackPolicy {
  /// Ask the promotions engine anyway, with a missing id, and report its answer.
  #[default]
  AttemptWithoutId,
  /// Fail with `NotFound` without calling the engine.
  RequireRecordedId,
}

impl RollbackPolicy {
  pub fn from_flag(require_recorded_id: bool) -> Self {
    if require_recorded_id {
      RollbackPolicy::RequireRecordedId
    } else {
      RollbackPolicy::AttemptWithoutId
    }
  }
}

/// Coupon code → redemption id, one active entry per code.
#[async_trait]
pub trait RedemptionStore: Send + Sync {
  /// Records a redemption, overwriting any earlier one for the same code.
  /// Returns the overwritten id.
  async fn record(&self, code: &str, redemption_id: &str) -> Result<Option<String>>;

  async fn lookup(&self, code: &str) -> Result<Option<String>>;

  /// Removes the entry for `code` only if it still maps to `expected_id`.
  /// Returns whether an entry was removed.
  async fn forget(&self, code: &str, expected_id: Option<&str>) -> Result<bool>;

  async fn len(&self) -> Result<usize>;

  async fn is_empty(&self) -> Result<bool> {
    Ok(self.len().await? == 0)
  }
}

/// Process-local store. Each operation runs under one mutex.
#[derive(Debug, Default)]
pub struct InMemoryRedemptionStore {
  entries: Mutex<HashMap<String, String>>,
}

impl InMemoryRedemptionStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl RedemptionStore for InMemoryRedemptionStore {
  async fn record(&self, code: &str, redemption_id: &str) -> Result<Option<String>> {
    let previous = self
      .entries
      .lock()
      .insert(code.to_string(), redemption_id.to_string());
    if let Some(old) = &previous {
      warn!(coupon = %code, previous_redemption = %old, new_redemption = %redemption_id, "Overwriting tracked redemption");
    } else {
      debug!(coupon = %code, redemption_id = %redemption_id, "Tracking redemption");
    }
    Ok(previous)
  }

  async fn lookup(&self, code: &str) -> Result<Option<String>> {
    Ok(self.entries.lock().get(code).cloned())
  }

  async fn forget(&self, code: &str, expected_id: Option<&str>) -> Result<bool> {
    let mut entries = self.entries.lock();
    let unchanged = match (entries.get(code), expected_id) {
      (Some(current), Some(expected)) => current == expected,
      _ => false,
    };

    if unchanged {
      entries.remove(code);
      debug!(coupon = %code, "Forgot tracked redemption");
      return Ok(true);
    }
    if let Some(current) = entries.get(code) {
      debug!(coupon = %code, current = %current, "Tracked redemption changed since lookup, keeping it");
    }
    Ok(false)
  }

  async fn len(&self) -> Result<usize> {
    Ok(self.entries.lock().len())
  }
}
