//! Fixed-step clock for the draw loop.
//!
//! `draw_web()` fires at display rate with uneven gaps. [`GameTime`] turns
//! those timestamps into whole ticks so the question countdown advances at
//! the same rate on every device, and tests can drive it with plain numbers.

pub struct GameTime {
    ms_per_tick: f64,
    /// Milliseconds carried into the next frame.
    accumulator: f64,
    pub total_ticks: u64,
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a `performance.now()` timestamp; returns ticks to run this frame.
    ///
    /// Gaps are capped at 500ms, so a backgrounded tab costs at most half a
    /// second of countdown when it comes back.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, 500.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}
