//! Index arithmetic: latest-value selection, spread, and composition.

pub mod index;
pub mod spread;

pub use index::*;
pub use spread::*;
