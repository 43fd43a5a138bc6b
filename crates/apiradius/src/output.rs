//! Output formatting: table, JSON, YAML.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde.

use std::fmt::Write as _;
use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use apiradius_core::{ProfileState, RadiusAttribute};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item detail views are
/// laid out by hand.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(render_err),
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(render_err),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(render_err),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_err(e: impl std::fmt::Display) -> CliError {
    CliError::Render(e.to_string())
}

// ── Profile detail view ──────────────────────────────────────────────

#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "List")]
    list: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Op")]
    op: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

impl AttributeRow {
    fn new(list: &'static str, attr: &RadiusAttribute) -> Self {
        let flags: Vec<&str> = [
            (attr.expand, "expand"),
            (attr.do_xlat, "xlat"),
            (attr.is_json, "json"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();

        Self {
            list,
            name: attr.name.clone(),
            op: attr.op.to_string(),
            value: attr.value.join(", "),
            flags: flags.join(","),
        }
    }
}

pub fn profile_detail(state: &ProfileState) -> String {
    let p = &state.profile;
    let mut out = String::new();

    let _ = writeln!(out, "Profile:      {}", state.address);
    let _ = writeln!(out, "Enabled:      {}", p.enabled);
    let _ = writeln!(out, "Weight:       {}", p.weight);
    if !p.depends.is_empty() {
        let _ = writeln!(out, "Depends:      {}", p.depends.join(", "));
    }
    if let Some(ref desc) = p.description {
        let _ = writeln!(out, "Description:  {desc}");
    }
    if let Some(ref schema) = p.parameter_schema {
        let _ = writeln!(out, "Parameters:   {schema}");
    }

    let rows: Vec<AttributeRow> = p
        .reply
        .iter()
        .map(|a| AttributeRow::new("reply", a))
        .chain(p.control.iter().map(|a| AttributeRow::new("control", a)))
        .collect();

    if !rows.is_empty() {
        let _ = writeln!(out);
        out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    }

    out.trim_end().to_owned()
}
