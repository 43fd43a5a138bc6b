//! Command dispatch: bridges CLI args -> reconciler calls -> output formatting.

pub mod config_cmd;
pub mod profile;
pub mod util;
