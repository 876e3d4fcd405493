//! Terminal output helpers for droidcfg
//!
//! - Status lines (success, error, warning, info)
//! - Key/value listings for resolved configuration
//! - Error reports with code, context and suggestion

#![warn(missing_docs)]

pub mod output;
