//! Fixed-timestep accumulator
//!
//! Wall-clock deltas are banked and paid out in whole fixed steps; the
//! physics never sees a variable delta.

use crate::consts::{MAX_FRAME_TIME, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone, PartialEq)]
pub struct FixedClock {
    step: f32,
    accumulator: f32,
    max_substeps: u32,
    max_frame_time: f32,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(SIM_DT)
    }
}

impl FixedClock {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            max_substeps: MAX_SUBSTEPS,
            max_frame_time: MAX_FRAME_TIME,
        }
    }

    /// Cap catch-up work per frame to prevent a spiral of death
    pub fn with_limits(mut self, max_substeps: u32, max_frame_time: f32) -> Self {
        self.max_substeps = max_substeps.max(1);
        self.max_frame_time = max_frame_time;
        self
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Unspent time, always below one step unless the substep cap was hit
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Bank `elapsed` seconds and return how many fixed steps are due.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        let elapsed = if elapsed > self.max_frame_time {
            log::warn!(
                "Frame took {:.3}s, clamping to {:.3}s",
                elapsed,
                self.max_frame_time
            );
            self.max_frame_time
        } else {
            elapsed.max(0.0)
        };
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }
        // Hitting the cap drops the backlog instead of carrying it forward
        if steps == self.max_substeps && self.accumulator > self.step {
            log::debug!(
                "Dropping {:.3}s of simulation backlog",
                self.accumulator - self.step
            );
            self.accumulator = self.step;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_and_a_half_steps_run_two() {
        let mut clock = FixedClock::new(1.0 / 60.0);
        assert_eq!(clock.advance(2.5 / 60.0), 2);
        assert!((clock.accumulator() - 0.5 / 60.0).abs() < 1e-5);
        // The banked half step completes on the next frame
        assert_eq!(clock.advance(0.6 / 60.0), 1);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut clock = FixedClock::new(0.1);
        assert_eq!(clock.advance(0.04), 0);
        assert_eq!(clock.advance(0.04), 0);
        assert_eq!(clock.advance(0.04), 1);
    }

    #[test]
    fn test_substeps_are_capped() {
        let mut clock = FixedClock::new(0.01).with_limits(3, 1.0);
        assert_eq!(clock.advance(0.095), 3);
        // One step stays banked, the rest is dropped
        assert!((clock.accumulator() - 0.01).abs() < 1e-6);
        assert_eq!(clock.advance(0.0), 1);
    }

    #[test]
    fn test_small_step_backlog_stays_bounded() {
        let config = crate::config::WorldConfig::from_json(r#"{ "step": 0.001 }"#).unwrap();
        let mut clock =
            FixedClock::new(config.step).with_limits(config.max_substeps, config.max_frame_time);
        for _ in 0..600 {
            assert_eq!(clock.advance(1.0 / 60.0), config.max_substeps);
            assert!(clock.accumulator() <= config.step + 1e-6);
        }
        assert!(clock.accumulator() < config.max_frame_time);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = FixedClock::new(0.01).with_limits(100, 0.055);
        assert_eq!(clock.advance(10.0), 5);
    }

    #[test]
    fn test_negative_elapsed_is_ignored() {
        let mut clock = FixedClock::new(0.01);
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.accumulator(), 0.0);
    }
}
