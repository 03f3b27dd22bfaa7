//! Input/output helpers.
//!
//! - history CSV load/append/save (`history`)

pub mod history;

pub use history::*;
