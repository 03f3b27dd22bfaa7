//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - upstream observations (`YieldObservation`, `TrendObservation`)
//! - the persisted daily row (`AnxietyRecord`) and its `StressBand`
//! - resolved run settings (`RunConfig`)

pub mod types;

pub use types::*;
