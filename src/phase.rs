//! Narrative phases and the controller that moves a scene between them.
//!
//! A scene tells a short story in a fixed number of phases (for example
//! traditional → exponential → breaking → singularity). Under
//! [`PhasePolicy::Monotonic`] a scene only ever moves forward: asking for an
//! earlier or equal phase is ignored, and [`PhaseController::reset`] is the
//! only way back.
//!
//! ```
//! use coreflow_fx::phase::{Phase, PhaseController, PhasePolicy};
//!
//! let mut phases = PhaseController::new(4, PhasePolicy::Monotonic, 0.5);
//! assert!(phases.set_phase(Phase(2), 0.0).is_some());
//! assert!(phases.set_phase(Phase(1), 1.0).is_none());
//! assert_eq!(phases.current(), Phase(2));
//! ```

use serde::{Deserialize, Serialize};

/// Shortest allowed transition effect, in seconds.
pub const MIN_TRANSITION_SECS: f32 = 0.3;
/// Longest allowed transition effect, in seconds.
pub const MAX_TRANSITION_SECS: f32 = 0.8;

/// Index of a narrative phase, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Phase(pub u8);

impl Phase {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn next(self) -> Phase {
        Phase(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "phase {}", self.0)
    }
}

/// Which phase changes a scene accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhasePolicy {
    /// Forward only; the result of `set_phase(next)` is `max(current, next)`.
    #[default]
    Monotonic,
    /// Any phase in range.
    Free,
}

/// A completed phase change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
    /// Scene time of the change.
    pub at: f32,
}

/// Visual transition between two phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub started_at: f32,
    pub duration: f32,
}

impl Transition {
    /// Eased progress in `[0, 1]` at scene time `now`.
    pub fn progress(&self, now: f32) -> f32 {
        let t = ((now - self.started_at) / self.duration).clamp(0.0, 1.0);
        // smoothstep
        t * t * (3.0 - 2.0 * t)
    }

    pub fn is_complete(&self, now: f32) -> bool {
        now - self.started_at >= self.duration
    }

    /// Opacity multiplier for the fade effect: dips to 0.35 at the midpoint.
    pub fn fade(&self, now: f32) -> f32 {
        let p = self.progress(now);
        1.0 - 0.65 * (1.0 - (2.0 * p - 1.0).abs())
    }

    /// Scale multiplier for the zoom effect: grows in from 0.85.
    pub fn scale(&self, now: f32) -> f32 {
        0.85 + 0.15 * self.progress(now)
    }
}

/// Timer that advances one phase after `after` seconds without a change.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PhaseTimer {
    after: f32,
    armed_at: f32,
}

/// Owns the current phase of one scene.
#[derive(Debug, Clone)]
pub struct PhaseController {
    current: Phase,
    count: u8,
    policy: PhasePolicy,
    transition_secs: f32,
    transition: Option<Transition>,
    timer: Option<PhaseTimer>,
}

impl PhaseController {
    /// `count` phases (at least 1). The transition duration is clamped to
    /// [`MIN_TRANSITION_SECS`]..=[`MAX_TRANSITION_SECS`].
    pub fn new(count: u8, policy: PhasePolicy, transition_secs: f32) -> Self {
        Self {
            current: Phase(0),
            count: count.max(1),
            policy,
            transition_secs: transition_secs.clamp(MIN_TRANSITION_SECS, MAX_TRANSITION_SECS),
            transition: None,
            timer: None,
        }
    }

    #[inline]
    pub fn current(&self) -> Phase {
        self.current
    }

    #[inline]
    pub fn count(&self) -> u8 {
        self.count
    }

    #[inline]
    pub fn last(&self) -> Phase {
        Phase(self.count - 1)
    }

    pub fn policy(&self) -> PhasePolicy {
        self.policy
    }

    pub fn transition_secs(&self) -> f32 {
        self.transition_secs
    }

    /// The most recent transition, finished or not.
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Progress of the running transition; 1.0 when none is running.
    pub fn transition_progress(&self, now: f32) -> f32 {
        self.transition.map_or(1.0, |t| t.progress(now))
    }

    /// Request phase `next` at scene time `now`.
    ///
    /// Out-of-range phases are clamped to the last one. Returns the change,
    /// or `None` when the request was a no-op.
    pub fn set_phase(&mut self, next: Phase, now: f32) -> Option<PhaseChange> {
        let next = next.min(self.last());
        let accepted = match self.policy {
            PhasePolicy::Monotonic => next > self.current,
            PhasePolicy::Free => next != self.current,
        };
        if !accepted {
            return None;
        }
        Some(self.change_to(next, now))
    }

    /// Move one phase forward, if there is one.
    pub fn advance(&mut self, now: f32) -> Option<PhaseChange> {
        if self.current >= self.last() {
            return None;
        }
        self.set_phase(self.current.next(), now)
    }

    /// Go back to phase 0 regardless of policy. Clears the auto-advance timer.
    pub fn reset(&mut self, now: f32) -> Option<PhaseChange> {
        self.timer = None;
        if self.current == Phase(0) {
            self.transition = None;
            return None;
        }
        Some(self.change_to(Phase(0), now))
    }

    fn change_to(&mut self, next: Phase, now: f32) -> PhaseChange {
        let from = self.current;
        self.current = next;
        self.transition = Some(Transition {
            from,
            to: next,
            started_at: now,
            duration: self.transition_secs,
        });
        if let Some(timer) = &mut self.timer {
            timer.armed_at = now;
        }
        tracing::debug!(from = from.0, to = next.0, at = now, "phase change");
        PhaseChange { from, to: next, at: now }
    }

    /// Advance one phase automatically `after` seconds after the last change.
    /// `None` disarms the timer.
    pub fn set_auto_advance(&mut self, after: Option<f32>, now: f32) {
        self.timer = after
            .filter(|a| *a > 0.0)
            .map(|after| PhaseTimer { after, armed_at: now });
    }

    pub fn auto_advance_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Fire the auto-advance timer if it is due. Call once per frame.
    pub fn tick(&mut self, now: f32) -> Option<PhaseChange> {
        let timer = self.timer?;
        if now - timer.armed_at < timer.after {
            return None;
        }
        let change = self.advance(now);
        if change.is_none() {
            // Nothing left to advance to.
            self.timer = None;
        } else {
            tracing::debug!(after = timer.after, "auto-advance fired");
        }
        change
    }

    /// Drop every timer. Called on unmount.
    pub fn clear_timers(&mut self) {
        self.timer = None;
    }
}

/// Phase reached by a derived metric: one step per threshold it meets or
/// exceeds. Thresholds are expected in ascending order.
///
/// ```
/// use coreflow_fx::phase::{phase_for_metric, Phase, DEFAULT_METRIC_THRESHOLDS};
///
/// assert_eq!(phase_for_metric(5.0, &DEFAULT_METRIC_THRESHOLDS), Phase(0));
/// assert_eq!(phase_for_metric(150.0, &DEFAULT_METRIC_THRESHOLDS), Phase(2));
/// ```
pub fn phase_for_metric(value: f32, thresholds: &[f32]) -> Phase {
    let crossed = thresholds.iter().take_while(|t| value >= **t).count();
    Phase(crossed.min(u8::MAX as usize) as u8)
}

/// Multiplier thresholds for phases 1, 2 and 3.
pub const DEFAULT_METRIC_THRESHOLDS: [f32; 3] = [10.0, 100.0, 1000.0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_takes_max() {
        let mut c = PhaseController::new(4, PhasePolicy::Monotonic, 0.5);
        assert!(c.set_phase(Phase(1), 0.0).is_some());
        assert!(c.set_phase(Phase(0), 0.1).is_none());
        assert!(c.set_phase(Phase(1), 0.2).is_none());
        assert_eq!(c.current(), Phase(1));
        let change = c.set_phase(Phase(3), 0.3).unwrap();
        assert_eq!(change.from, Phase(1));
        assert_eq!(change.to, Phase(3));
    }

    #[test]
    fn free_policy_allows_going_back() {
        let mut c = PhaseController::new(4, PhasePolicy::Free, 0.5);
        c.set_phase(Phase(3), 0.0);
        assert!(c.set_phase(Phase(1), 1.0).is_some());
        assert_eq!(c.current(), Phase(1));
    }

    #[test]
    fn out_of_range_is_clamped() {
        let mut c = PhaseController::new(4, PhasePolicy::Monotonic, 0.5);
        c.set_phase(Phase(200), 0.0);
        assert_eq!(c.current(), Phase(3));
        assert!(c.advance(1.0).is_none());
    }

    #[test]
    fn reset_is_the_only_way_back() {
        let mut c = PhaseController::new(4, PhasePolicy::Monotonic, 0.5);
        c.set_phase(Phase(2), 0.0);
        let change = c.reset(1.0).unwrap();
        assert_eq!(change.to, Phase(0));
        assert!(c.reset(2.0).is_none());
    }

    #[test]
    fn transition_duration_is_clamped() {
        assert_eq!(PhaseController::new(2, PhasePolicy::Monotonic, 0.0).transition_secs(), 0.3);
        assert_eq!(PhaseController::new(2, PhasePolicy::Monotonic, 9.0).transition_secs(), 0.8);
    }

    #[test]
    fn transition_progress_is_eased_and_bounded() {
        let mut c = PhaseController::new(3, PhasePolicy::Monotonic, 0.5);
        assert_eq!(c.transition_progress(0.0), 1.0);
        c.set_phase(Phase(1), 1.0);
        assert_eq!(c.transition_progress(1.0), 0.0);
        assert!((c.transition_progress(1.25) - 0.5).abs() < 1e-6);
        assert_eq!(c.transition_progress(5.0), 1.0);
        let t = c.transition().unwrap();
        assert!(t.is_complete(1.5));
        assert!(t.fade(1.25) < t.fade(1.5));
        assert_eq!(t.scale(1.5), 1.0);
    }

    #[test]
    fn auto_advance_fires_and_rearms() {
        let mut c = PhaseController::new(3, PhasePolicy::Monotonic, 0.5);
        c.set_auto_advance(Some(5.0), 0.0);
        assert!(c.tick(4.9).is_none());
        assert_eq!(c.tick(5.0).unwrap().to, Phase(1));
        assert!(c.tick(9.0).is_none());
        assert_eq!(c.tick(10.0).unwrap().to, Phase(2));
        // Last phase reached: timer retires.
        assert!(c.tick(20.0).is_none());
        assert!(!c.auto_advance_armed());
    }

    #[test]
    fn manual_change_rearms_timer() {
        let mut c = PhaseController::new(4, PhasePolicy::Monotonic, 0.5);
        c.set_auto_advance(Some(5.0), 0.0);
        c.set_phase(Phase(1), 4.0);
        assert!(c.tick(6.0).is_none());
        assert_eq!(c.tick(9.0).unwrap().to, Phase(2));
    }

    #[test]
    fn reset_clears_timer() {
        let mut c = PhaseController::new(4, PhasePolicy::Monotonic, 0.5);
        c.set_auto_advance(Some(1.0), 0.0);
        c.reset(0.5);
        assert!(!c.auto_advance_armed());
        assert!(c.tick(10.0).is_none());
    }

    #[test]
    fn metric_thresholds() {
        let t = DEFAULT_METRIC_THRESHOLDS;
        assert_eq!(phase_for_metric(0.0, &t), Phase(0));
        assert_eq!(phase_for_metric(10.0, &t), Phase(1));
        assert_eq!(phase_for_metric(999.0, &t), Phase(2));
        assert_eq!(phase_for_metric(1e6, &t), Phase(3));
    }
}
