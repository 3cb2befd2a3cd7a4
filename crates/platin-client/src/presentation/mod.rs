//! Text rendering for the `platin` command-line tool.
//!
//! Every function returns the exact text printed to stdout, without a
//! trailing newline.  `quiet` drops labels and prints bare values, which is
//! what scripts want.

use platin_core::Source;

use crate::domain::HubError;

/// `Power: on` / `on`.
pub fn format_power(on: bool, quiet: bool) -> String {
    let state = if on { "on" } else { "off" };
    if quiet {
        state.to_string()
    } else {
        format!("Power: {state}")
    }
}

/// `Volume: 42` / `42`.
pub fn format_volume(level: u8, quiet: bool) -> String {
    if quiet {
        level.to_string()
    } else {
        format!("Volume: {level}")
    }
}

/// Lists sources in hub order, marking the active one.
///
/// ```text
/// Sources:
///  - Optical
///  * Bluetooth
/// ```
///
/// Quiet mode prints one bare name per line.
pub fn format_sources(sources: &[Source], quiet: bool) -> String {
    if quiet {
        return sources
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut out = String::from("Sources:");
    for source in sources {
        let marker = if source.active { '*' } else { '-' };
        out.push_str(&format!("\n {marker} {}", source.name));
    }
    out
}

/// `Bluetooth: active` / `Bluetooth`.
pub fn format_active_source(source: &Source, quiet: bool) -> String {
    if quiet {
        source.name.clone()
    } else {
        format!("{}: active", source.name)
    }
}

/// `error reading volume: timed out ...`, for stderr.
pub fn format_failure(doing: &str, err: &dyn std::fmt::Display) -> String {
    format!("error {doing}: {err}")
}

/// Follow-up advice printed under a failure, if there is any.
pub fn failure_hint(err: &HubError) -> Option<&'static str> {
    if err.is_source_not_found() {
        Some("hint: run `platin source` to list the exact source names")
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
