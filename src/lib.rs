//! `credit-anxiety` library crate.
//!
//! The binary (`anxiety`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes or hitting the network
//! - upstream sources sit behind traits and can be swapped for fakes
//! - "today" is a parameter, not a global

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
