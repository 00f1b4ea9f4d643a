//! Time-based value smoothing.
//!
//! The simulator reads atmospheric values every frame, but the forecast they
//! come from updates in discrete, bursty steps. [`TransitionEngine`] bridges
//! the two: each output value is tracked under a string key and moved toward
//! its target at a bounded rate per call, so no consumer ever sees a jump.
//!
//! Keys use a `-` separated prefix convention (`wind-alt1-speed`,
//! `cloud-0-coverage`); the prefix groups related keys so a context change
//! can drop exactly the smoothing history that went stale.

use std::collections::HashMap;

use crate::geo::{normalize_heading, shortest_heading_delta};

/// Default smoothing speed in units per second.
pub const DEFAULT_SPEED: f64 = 0.25;

/// Default heading angular velocity in degrees per second.
pub const DEFAULT_ANGULAR_VELOCITY: f64 = 1.0;

/// Keyed smoothing state. One instance per consumer context.
#[derive(Debug, Default)]
pub struct TransitionEngine {
    refs: HashMap<String, f64>,
}

impl TransitionEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the value tracked under `key` toward `target`.
    ///
    /// The first call for a key seeds it and returns `target` unchanged.
    /// Afterwards the value steps by `speed * elapsed` per call while the
    /// remaining gap exceeds `speed * elapsed + speed`, and snaps to the
    /// target once inside that band.
    pub fn transition(&mut self, key: &str, target: f64, elapsed: f64, speed: f64) -> f64 {
        let Some(&current) = self.refs.get(key) else {
            self.refs.insert(key.to_string(), target);
            return target;
        };

        let direction = if current > target { -1.0 } else { 1.0 };
        let result = if (current - target).abs() > speed * elapsed + speed {
            current + direction * speed * elapsed
        } else {
            target
        };

        self.refs.insert(key.to_string(), result);
        result
    }

    /// Move the heading tracked under `key` toward `target` along the
    /// shortest arc.
    ///
    /// The first call for a key seeds it and returns the target normalized.
    /// Afterwards the heading steps by `angular_velocity * elapsed` degrees
    /// per call, snapping once the shortest delta is smaller than one step.
    /// Results are always in `[0, 360)`.
    pub fn transition_heading(
        &mut self,
        key: &str,
        target: f64,
        elapsed: f64,
        angular_velocity: f64,
    ) -> f64 {
        let Some(&current) = self.refs.get(key) else {
            let seeded = normalize_heading(target);
            self.refs.insert(key.to_string(), seeded);
            return seeded;
        };

        let delta = shortest_heading_delta(current, target);
        let result = if delta.abs() < angular_velocity * elapsed {
            normalize_heading(target)
        } else {
            normalize_heading(current + delta.signum() * angular_velocity * elapsed)
        };

        self.refs.insert(key.to_string(), result);
        result
    }

    /// Drop all smoothing state. The next call for any key re-seeds it.
    pub fn clear(&mut self) {
        self.refs.clear();
    }

    /// Drop every key whose prefix (the portion before the first `-`) is in
    /// `prefixes`.
    pub fn clear_prefixes(&mut self, prefixes: &[&str]) {
        self.refs.retain(|key, _| !prefixes.contains(&key_prefix(key)));
    }

    /// Drop every key whose prefix is NOT in `prefixes`.
    pub fn retain_prefixes(&mut self, prefixes: &[&str]) {
        self.refs.retain(|key, _| prefixes.contains(&key_prefix(key)));
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

fn key_prefix(key: &str) -> &str {
    key.split_once('-').map_or(key, |(prefix, _)| prefix)
}
