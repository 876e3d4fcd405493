//! Core utilities for droidcfg
//!
//! Shared functionality used by the resolver and the command-line front end:
//!
//! - **Error handling**: structured errors with codes, context and recovery suggestions
//! - **Configuration**: `.droidcfg.toml` loading with defaults for every field
//! - **Validation**: fluent field validation that collects every failure
//! - **Process execution**: command wrappers used to drive Gradle
//!
//! # Example
//!
//! ```rust,no_run
//! use droidcfg_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid .droidcfg.toml");
//! println!("log level: {}", config.schema.logging.level);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};
