//! Fixed-step frame clock for the particle simulation

use tracing::debug;

/// One simulation step per 60 Hz display frame
pub const STEP_SECS: f32 = 1.0 / 60.0;

/// Upper bound on catch-up steps after a stall
pub const MAX_STEPS_PER_FRAME: u32 = 4;

/// Turns variable frame deltas into whole simulation steps.
///
/// Runs from construction until `teardown`, after which it never yields
/// another step.
#[derive(Debug)]
pub struct RenderLoop {
    running: bool,
    accumulator: f32,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            running: true,
            accumulator: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Feed one frame's delta time, get the number of steps to simulate
    pub fn frame(&mut self, dt: f32) -> u32 {
        if !self.running {
            return 0;
        }

        self.accumulator += dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= STEP_SECS && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= STEP_SECS;
            steps += 1;
        }

        // Drop the backlog rather than spiral after a long stall
        if steps == MAX_STEPS_PER_FRAME {
            self.accumulator = self.accumulator.min(STEP_SECS);
        }
        steps
    }

    /// Stop the loop for good
    pub fn teardown(&mut self) {
        if self.running {
            debug!("Render loop torn down");
        }
        self.running = false;
        self.accumulator = 0.0;
    }
}
