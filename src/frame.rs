// Frame loop state: close handling and FPS sampling

use std::time::{Duration, Instant};

/// Lifecycle of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Escape or the window's close control was used. The current frame
    /// still presents; the loop exits before the next one.
    CloseRequested,
    /// GL objects and the window have been released.
    Terminated,
}

impl LoopState {
    pub fn request_close(&mut self) {
        if *self == LoopState::Running {
            *self = LoopState::CloseRequested;
        }
    }

    pub fn is_running(self) -> bool {
        self == LoopState::Running
    }
}

/// Frames-per-second over consecutive, non-overlapping sampling windows.
///
/// Every frame is counted; once at least `interval` has passed since the
/// last sample point the rate for that window is reported and the count
/// starts over.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: Duration,
    frame_count: u32,
    last_sample: Instant,
}

impl FpsCounter {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            frame_count: 0,
            last_sample: now,
        }
    }

    /// Count a frame. Returns the new FPS value when a window closes.
    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        self.frame_count += 1;

        let elapsed = now.saturating_duration_since(self.last_sample);
        if elapsed < self.interval || elapsed.is_zero() {
            return None;
        }

        let fps = f64::from(self.frame_count) / elapsed.as_secs_f64();
        self.frame_count = 0;
        self.last_sample = now;
        Some(fps)
    }
}

/// Window title carrying the latest FPS sample
pub fn fps_title(title: &str, fps: f64) -> String {
    format!("{} @ fps: {:.1}", title, fps)
}
