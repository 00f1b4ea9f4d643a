//! Randomized wander patterns.
//!
//! Produces continuously varying pseudo-random values such as gust strength
//! and shifting wind headings by chaining cosine-eased
//! segments between random targets. Each segment starts exactly where the
//! previous one left off, so the output never jumps, and the zero-slope
//! endpoints of the cosine law keep the joins smooth.

use std::collections::HashMap;

use rand::Rng;

use crate::interp;

/// One wander segment: ease from `start_value` to `end_value` over the
/// accumulated-time window `[segment_start, segment_end]`.
#[derive(Debug, Clone, Copy)]
struct Segment {
    start_value: f64,
    end_value: f64,
    segment_start: f64,
    segment_end: f64,
    elapsed: f64,
}

/// Keyed wander state. One instance per consumer context.
#[derive(Debug, Default)]
pub struct WanderGenerator {
    refs: HashMap<String, Segment>,
}

impl WanderGenerator {
    /// Create an empty generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the scalar pattern under `key` by `elapsed` and return its
    /// current value.
    ///
    /// The first call yields `min`. When a segment's duration is exhausted a
    /// new one begins at the value just returned, targeting a uniform-random
    /// value in `[min, max]` over a uniform-random duration in
    /// `[min_duration, max_duration]`.
    pub fn wander(
        &mut self,
        key: &str,
        elapsed: f64,
        min: f64,
        max: f64,
        min_duration: f64,
        max_duration: f64,
    ) -> f64 {
        self.advance(key, elapsed, min, max, min_duration, max_duration, false)
    }

    /// Heading-aware variant of [`wander`](Self::wander): interpolates along
    /// the shortest arc and keeps results in `[0, 360)`.
    pub fn wander_heading(
        &mut self,
        key: &str,
        elapsed: f64,
        min: f64,
        max: f64,
        min_duration: f64,
        max_duration: f64,
    ) -> f64 {
        self.advance(key, elapsed, min, max, min_duration, max_duration, true)
    }

    /// Drop all pattern state.
    pub fn clear(&mut self) {
        self.refs.clear();
    }

    fn advance(
        &mut self,
        key: &str,
        elapsed: f64,
        min: f64,
        max: f64,
        min_duration: f64,
        max_duration: f64,
        heading: bool,
    ) -> f64 {
        let segment = self.refs.entry(key.to_string()).or_insert(Segment {
            start_value: min,
            end_value: 0.0,
            segment_start: 0.0,
            segment_end: 0.0,
            elapsed: 0.0,
        });

        let ret = if heading {
            interp::cosine_heading(
                segment.start_value,
                segment.end_value,
                segment.segment_start,
                segment.segment_end,
                segment.elapsed,
            )
        } else {
            interp::cosine(
                segment.start_value,
                segment.end_value,
                segment.segment_start,
                segment.segment_end,
                segment.elapsed,
            )
        };

        segment.elapsed += elapsed;

        if segment.elapsed >= segment.segment_end {
            // New segment starts at the value just returned: no jump across
            // the rollover.
            let mut rng = rand::rng();
            segment.start_value = ret;
            segment.end_value = min + rng.random::<f64>() * (max - min);
            segment.segment_start = segment.elapsed;
            segment.segment_end =
                segment.elapsed + min_duration + rng.random::<f64>() * (max_duration - min_duration);
        }

        ret
    }
}
