//! Shared helpers for command handlers.

use std::path::Path;

use apiradius_core::{ProfileInput, RadiusProfile};

use crate::error::CliError;

/// Read a profile definition and validate it. No network access.
///
/// `.yaml` / `.yml` files are parsed as YAML, everything else as JSON.
pub fn read_profile_file(path: &Path) -> Result<RadiusProfile, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let input: ProfileInput = if is_yaml {
        serde_yaml::from_str(&contents).map_err(|e| file_err(path, e))?
    } else {
        serde_json::from_str(&contents).map_err(|e| file_err(path, e))?
    };

    Ok(RadiusProfile::try_from(input)?)
}

fn file_err(path: &Path, e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "file".into(),
        reason: format!("{}: {e}", path.display()),
    }
}
