// core/src/core/control.rs

//! Flow-control signals returned by handlers, and the outcome of a whole run.

/// Returned by a handler to let the pipeline move on or halt without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt now. No later handler or step runs.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran (or was skipped by its condition).
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
