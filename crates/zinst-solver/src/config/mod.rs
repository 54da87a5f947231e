//! Solver configuration
//!
//! Values are layered in priority order, highest first:
//!
//! 1. Environment variables (`ZINST_*`)
//! 2. A JSON configuration file (`solver.json` in the config home by default)
//! 3. Built-in defaults
//!
//! ```rust,no_run
//! use zinst_solver::config::SolverConfig;
//!
//! let config = SolverConfig::build(None::<&str>, true).unwrap();
//! println!("network use: {}", config.network_use);
//! ```

mod config;
mod source;

pub use config::{NetworkLevel, SolverConfig};
pub use source::{ConfigLoader, ConfigSource, RawConfig};
