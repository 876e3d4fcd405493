//! Tool configuration (`.droidcfg.toml`) loading and schema

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
