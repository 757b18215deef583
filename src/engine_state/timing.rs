//! Frame timing and periodic performance statistics.

use std::fmt;

use web_time::{Duration, Instant};

/// Measures the time between consecutive frames.
#[derive(Debug, Default)]
pub struct TickInterval {
    previous: Option<Instant>,
}

impl TickInterval {
    /// Creates an interval that has not ticked yet.
    pub fn new() -> Self {
        TickInterval { previous: None }
    }

    /// Seconds since the previous tick, or `None` on the first tick.
    pub fn tick(&mut self) -> Option<f32> {
        self.tick_at(Instant::now())
    }

    /// Same as [`tick`](Self::tick) with an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> Option<f32> {
        let dt = self
            .previous
            .map(|previous| now.saturating_duration_since(previous).as_secs_f32());
        self.previous = Some(now);
        dt
    }
}

/// Averages over one statistics window.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct FrameReport {
    /// Frames per second
    pub fps: f32,
    /// Average physics time per frame in milliseconds
    pub physics_ms: f32,
    /// Average streaming bookkeeping time per frame in milliseconds
    pub streaming_ms: f32,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} fps, physics {:.3} ms/frame, streaming {:.3} ms/frame",
            self.fps, self.physics_ms, self.streaming_ms
        )
    }
}

/// Accumulates per-frame costs and produces a [`FrameReport`] once per window.
#[derive(Debug)]
pub struct FrameStats {
    window: Duration,
    window_start: Option<Instant>,
    frames: u32,
    physics: Duration,
    streaming: Duration,
}

impl FrameStats {
    /// Creates statistics reported every `window`.
    pub fn new(window: Duration) -> Self {
        FrameStats {
            window,
            window_start: None,
            frames: 0,
            physics: Duration::ZERO,
            streaming: Duration::ZERO,
        }
    }

    /// Records one frame ending at `now`.
    ///
    /// Returns the report and starts a new window once `window` has elapsed since the
    /// window started. The first recorded frame only opens the window.
    pub fn record(&mut self, now: Instant, physics: Duration, streaming: Duration) -> Option<FrameReport> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return None;
        };

        self.frames += 1;
        self.physics += physics;
        self.streaming += streaming;

        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.window {
            return None;
        }

        let frames = self.frames as f32;
        let report = FrameReport {
            fps: frames / elapsed.as_secs_f32(),
            physics_ms: self.physics.as_secs_f32() * 1000.0 / frames,
            streaming_ms: self.streaming.as_secs_f32() * 1000.0 / frames,
        };

        self.window_start = Some(now);
        self.frames = 0;
        self.physics = Duration::ZERO;
        self.streaming = Duration::ZERO;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_no_interval() {
        let start = Instant::now();
        let mut interval = TickInterval::new();
        assert_eq!(interval.tick_at(start), None);
        let dt = interval.tick_at(start + Duration::from_millis(20)).unwrap();
        assert!((dt - 0.02).abs() < 1e-6);
        let dt = interval.tick_at(start + Duration::from_millis(30)).unwrap();
        assert!((dt - 0.01).abs() < 1e-6);
    }

    #[test]
    fn reports_once_per_window() {
        let start = Instant::now();
        let mut stats = FrameStats::new(Duration::from_secs(5));
        assert_eq!(stats.record(start, Duration::ZERO, Duration::ZERO), None);

        let frame = Duration::from_millis(20);
        let mut report = None;
        for i in 1..=250 {
            let now = start + frame * i;
            let result = stats.record(now, Duration::from_millis(2), Duration::from_millis(1));
            if i < 250 {
                assert_eq!(result, None);
            } else {
                report = result;
            }
        }

        let report = report.unwrap();
        assert!((report.fps - 50.0).abs() < 1e-3);
        assert!((report.physics_ms - 2.0).abs() < 1e-3);
        assert!((report.streaming_ms - 1.0).abs() < 1e-3);

        let next = start + frame * 251;
        assert_eq!(stats.record(next, Duration::ZERO, Duration::ZERO), None);
    }
}
