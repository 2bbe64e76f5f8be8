/// Fixed timestep accumulator.
/// Ensures game logic runs at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// A frame-clock timer: advanced explicitly once per tick, never by a thread.
///
/// Used for the match clock, the chalk countdown and splash messages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    duration: f32,
    remaining: f32,
    running: bool,
}

impl Countdown {
    /// A stopped timer with nothing left on it.
    pub fn idle() -> Self {
        Self {
            duration: 0.0,
            remaining: 0.0,
            running: false,
        }
    }

    /// A timer already counting down from `duration` seconds.
    pub fn started(duration: f32) -> Self {
        let mut timer = Self::idle();
        timer.start(duration);
        timer
    }

    /// (Re)start the countdown from `duration` seconds.
    pub fn start(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.remaining = self.duration;
        self.running = true;
    }

    /// Advance by `dt` seconds. Returns `true` only on the tick the timer expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        if self.remaining <= 0.0 {
            self.running = false;
            return true;
        }
        false
    }

    /// Stop without firing. A cancelled timer never reports expiry.
    pub fn cancel(&mut self) {
        self.running = false;
        self.remaining = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds left (0 once expired or cancelled).
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Elapsed fraction in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        1.0 - self.remaining / self.duration
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::idle()
    }
}
