#![forbid(unsafe_code)]

//! Scenario runner for `pipcam-core`.
//!
//! Drives the corner snap controller and the session cost reducer against a
//! simulated capture device and an instantly landing animator, then prints
//! JSON reports.

pub mod cli;
pub mod error;
pub mod logging;
pub mod scenario;
pub mod sim;

pub use cli::run_from_env;
pub use error::{HarnessError, Result};
