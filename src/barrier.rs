//! Completion barrier accounting between phases.
//!
//! The fan-out helpers in [`crate::runner`] join every task they spawned
//! before returning, so by the time a barrier is checked no producer is
//! still running. What the barrier adds is the count: each task publishes
//! exactly one message (its output or its failure), and a phase only counts
//! as complete when all of them have arrived. Anything less means tasks
//! were skipped by cancellation and the phase output must not be used.

use crate::error::{Phase, PipelineError};
use tracing::debug;

#[derive(Debug)]
pub struct PhaseBarrier {
    phase: Phase,
    expected: usize,
    arrived: usize,
}

impl PhaseBarrier {
    pub fn new(phase: Phase, expected: usize) -> Self {
        Self {
            phase,
            expected,
            arrived: 0,
        }
    }

    /// Record one published task result.
    pub fn arrive(&mut self) {
        self.arrived += 1;
    }

    pub fn arrived(&self) -> usize {
        self.arrived
    }

    pub fn is_complete(&self) -> bool {
        self.arrived == self.expected
    }

    /// Close the barrier, failing if any task never published.
    pub fn close(self) -> Result<(), PipelineError> {
        if self.is_complete() {
            debug!(phase = %self.phase, tasks = self.expected, "barrier closed");
            Ok(())
        } else {
            Err(PipelineError::BarrierIncomplete {
                phase: self.phase,
                expected: self.expected,
                arrived: self.arrived,
            })
        }
    }
}
