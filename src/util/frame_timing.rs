//! Wall-clock frame deltas for hosts that drive the stage in real time.

use web_time::{Duration, Instant};

/// Per-frame delta clock with FPS smoothing.
///
/// Hands the stage one `dt` per rendered frame. Deltas are clamped so a
/// backgrounded tab or a debugger pause doesn't teleport every creature
/// along its path.
pub struct FrameClock {
    /// Last frame timestamp
    last_frame: Instant,
    /// Largest delta ever reported
    max_delta: Duration,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl FrameClock {
    /// Default clamp on a single frame delta.
    pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(100);

    /// Create a clock starting now with the default delta clamp.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_delta(Self::DEFAULT_MAX_DELTA)
    }

    /// Create a clock starting now with a custom delta clamp.
    #[must_use]
    pub fn with_max_delta(max_delta: Duration) -> Self {
        Self {
            last_frame: Instant::now(),
            max_delta,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Seconds elapsed since the previous call (or construction), clamped.
    pub fn delta(&mut self) -> f32 {
        self.delta_at(Instant::now())
    }

    /// Same as [`delta`](Self::delta) but against an explicit timestamp.
    pub fn delta_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        let frame_time = elapsed.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }

        elapsed.min(self.max_delta).as_secs_f32()
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_clamped() {
        let mut clock = FrameClock::with_max_delta(Duration::from_millis(50));
        let later = Instant::now() + Duration::from_secs(3);
        let dt = clock.delta_at(later);
        assert!((dt - 0.05).abs() < 1e-6);
    }

    #[test]
    fn time_going_backwards_yields_zero() {
        let mut clock = FrameClock::new();
        let later = Instant::now() + Duration::from_millis(20);
        let _ = clock.delta_at(later);
        let earlier = later - Duration::from_millis(10);
        assert_eq!(clock.delta_at(earlier), 0.0);
    }

    #[test]
    fn fps_tracks_frame_rate() {
        let mut clock = FrameClock::new();
        let mut now = Instant::now();
        for _ in 0..400 {
            now += Duration::from_millis(33);
            let _ = clock.delta_at(now);
        }
        assert!((clock.fps() - 30.3).abs() < 1.0, "fps = {}", clock.fps());
    }
}
