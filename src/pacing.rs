// Frame pacing for the animation loop. requestAnimationFrame fires at the
// display rate, usually 60Hz, so every callback asks the pacer whether enough
// time has passed to run another tick of the capped 40Hz animation.

pub const TARGET_FPS: f64 = 40.0;

pub struct FramePacer {
    interval_ms: f64,
    last_tick: f64,
}

impl FramePacer {
    pub fn new(fps: f64) -> FramePacer {
        FramePacer {
            interval_ms: 1000.0 / fps,
            last_tick: 0.0,
        }
    }

    // Returns true when a tick is due. The remainder of the elapsed time is
    // carried over so the cadence tracks the wall clock instead of drifting
    // by a fraction of the budget every frame.
    pub fn should_tick(&mut self, now: f64) -> bool {
        let elapsed = now - self.last_tick;
        if elapsed < self.interval_ms {
            return false;
        }
        self.last_tick = now - (elapsed % self.interval_ms);
        true
    }

    // Restarts timing from scratch, as if the loop had just been created.
    // Used when the tab becomes visible again; the hidden interval is not
    // compensated for.
    pub fn reset(&mut self) {
        self.last_tick = 0.0;
    }
}
