//! Frame clock.
//!
//! [`Time`] is the single source of elapsed time for a scene. The host calls
//! [`Time::update`] once per displayed frame (wall clock), or
//! [`Time::advance`] with an explicit delta for headless runs and tests.
//!
//! Elapsed time is accumulated from per-frame deltas, so it never decreases:
//! pausing freezes it and changing the time scale only affects future frames.
//!
//! # Example
//!
//! ```
//! use coreflow_fx::time::Time;
//!
//! let mut time = Time::new();
//! time.advance(1.0 / 60.0);
//! time.advance(1.0 / 60.0);
//!
//! assert_eq!(time.frame(), 2);
//! assert!((time.elapsed() - 2.0 / 60.0).abs() < 1e-6);
//! ```

use std::time::Instant;

/// Time tracking for frame-driven scenes.
#[derive(Debug, Clone)]
pub struct Time {
    /// When the last wall-clock frame occurred.
    last_frame: Instant,
    /// Total elapsed scene time in seconds.
    elapsed_secs: f32,
    /// Scene time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Elapsed time at last FPS update.
    fps_update_elapsed: f32,
    /// How often to update FPS calculation, in seconds.
    fps_update_interval: f32,
    paused: bool,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
}

impl Time {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_elapsed: 0.0,
            fps_update_interval: 0.5,
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Tick from the wall clock. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(raw_delta)
    }

    /// Tick by an explicit amount of real time in seconds.
    ///
    /// Negative deltas are treated as zero. A configured fixed delta
    /// replaces `raw_delta`, and the time scale applies afterwards.
    pub fn advance(&mut self, raw_delta: f32) -> (f32, f32) {
        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, self.delta_secs);
        }

        let raw_delta = self.fixed_delta.unwrap_or(raw_delta).max(0.0);
        self.delta_secs = raw_delta * self.time_scale;
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        let since_fps = self.elapsed_secs - self.fps_update_elapsed;
        if since_fps >= self.fps_update_interval && since_fps > 0.0 {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / since_fps;
            self.fps_frame_count = self.frame_count;
            self.fps_update_elapsed = self.elapsed_secs;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed scene time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Scene time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second of scene time.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Pause time progression.
    ///
    /// While paused, `delta()` returns 0 and `elapsed()` stops increasing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume time progression after pausing.
    pub fn resume(&mut self) {
        if self.paused {
            // Time spent paused never reaches the next delta.
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Set a fixed delta time for deterministic updates.
    ///
    /// Pass `None` to use real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.map(|d| d.max(0.0));
    }

    /// Set time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed (slow motion)
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Reset the clock to its initial state, keeping scale and fixed delta.
    pub fn reset(&mut self) {
        let scale = self.time_scale;
        let fixed = self.fixed_delta;
        *self = Self::new();
        self.time_scale = scale;
        self.fixed_delta = fixed;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
        assert!(!time.is_paused());
        assert_eq!(time.time_scale(), 1.0);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_time_pause() {
        let mut time = Time::new();
        time.advance(0.5);

        time.pause();
        assert!(time.is_paused());

        let elapsed_before = time.elapsed();
        time.advance(1.0);

        assert_eq!(time.elapsed(), elapsed_before);
        assert_eq!(time.delta(), 0.0);

        time.resume();
        time.advance(0.25);
        assert!((time.elapsed() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_time_scale() {
        let mut time = Time::new();
        time.set_time_scale(2.0);
        time.advance(0.5);
        assert!((time.elapsed() - 1.0).abs() < 1e-6);

        // Negative scale should clamp to 0
        time.set_time_scale(-1.0);
        assert_eq!(time.time_scale(), 0.0);
    }

    #[test]
    fn test_fixed_delta() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(1.0 / 60.0));

        thread::sleep(Duration::from_millis(20));
        time.update();

        let expected = 1.0 / 60.0;
        assert!((time.delta() - expected).abs() < 0.0001);
    }

    #[test]
    fn negative_delta_never_rewinds() {
        let mut time = Time::new();
        time.advance(1.0);
        time.advance(-5.0);
        assert_eq!(time.elapsed(), 1.0);
        assert_eq!(time.delta(), 0.0);
    }

    #[test]
    fn fps_tracks_scene_time() {
        let mut time = Time::new();
        for _ in 0..60 {
            time.advance(1.0 / 60.0);
        }
        assert!((time.fps() - 60.0).abs() < 1.0);
    }
}
