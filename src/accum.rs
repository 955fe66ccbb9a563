//! Progressive-render accumulation control.
//!
//! The path-tracing shader blends every new sample into a running per-pixel
//! average weighted by a frame counter. The counter here is the CPU side of
//! that contract: it is uploaded as a uniform once per tick and incremented
//! afterwards, and it must drop back to zero before the first tick that renders
//! a changed scene. A missed reset does not crash anything; it shows up as
//! ghosting where pre- and post-change samples were averaged together.

use crate::events::Invalidation;

/// Frame counter for the GPU accumulation shader.
///
/// The only correctness invariant: scene state is constant between two resets.
#[derive(Debug, Default)]
pub struct AccumulationController {
    frame: u32,
    needs_reset: bool,
}

impl AccumulationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pending reset. Cheap and idempotent; call it for every
    /// image-affecting change, before the next [`begin_frame`](Self::begin_frame).
    pub fn invalidate(&mut self, event: Invalidation) {
        log::debug!("accumulation reset requested: {:?}", event);
        self.needs_reset = true;
    }

    /// Render tick: applies a pending reset, returns the counter value to
    /// upload as the shader uniform, then increments it.
    pub fn begin_frame(&mut self) -> u32 {
        if self.needs_reset {
            self.frame = 0;
            self.needs_reset = false;
        }
        let uniform = self.frame;
        self.frame += 1;
        uniform
    }

    pub fn needs_reset(&self) -> bool {
        self.needs_reset
    }

    /// Clears a pending reset and reports whether one was pending. For callers
    /// that zero the counter themselves (e.g. when re-creating the target
    /// texture on resize).
    pub fn consume_reset(&mut self) -> bool {
        let pending = self.needs_reset;
        if pending {
            self.frame = 0;
            self.needs_reset = false;
        }
        pending
    }

    /// Number of completed accumulation frames since the last reset.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Total samples per pixel accumulated so far at the given sampling rate.
    pub fn samples(&self, samples_per_pixel: u32) -> u64 {
        u64::from(self.frame) * u64::from(samples_per_pixel)
    }
}
