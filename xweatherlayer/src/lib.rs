//! XWeatherLayer - Smooth NOAA weather streaming for X-Plane
//!
//! This library keeps a running flight simulator supplied with continuous
//! atmospheric values derived from the World Area Forecast System. Forecast
//! cycles are fetched in the background as they are published
//! ([`wafs::WafsService`]), and the discrete updates they deliver are turned
//! into smooth trajectories by the transition engine ([`transition`]) and
//! the wander generator ([`pattern`]), with the shared interpolation,
//! geometry, and conversion primitives underneath.

pub mod atmos;
pub mod convert;
pub mod cycle;
pub mod geo;
pub mod interp;
pub mod pattern;
pub mod transition;
pub mod wafs;

pub use cycle::{current_cycle, CycleDescriptor};
pub use pattern::WanderGenerator;
pub use transition::TransitionEngine;
pub use wafs::{WafsConfig, WafsService};
