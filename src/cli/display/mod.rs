//! Display helpers for CLI output formatting.

pub mod table;

use console::{style, StyledObject};
use serde::Serialize;

pub use table::{list_table, render_list};

/// Trait for types that can be rendered as human-readable or JSON output.
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

/// Dispatch output based on JSON mode flag.
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_json()).unwrap_or_default()
        );
    } else {
        println!("{}", result.to_human());
    }
}

/// Render a success action result.
pub fn action_success(message: &str) -> String {
    format!("{} {}", style("\u{2713}").green().bold(), message)
}

/// Styled task status.
///
/// Green: completed. Yellow: in progress. Blue: pending. Cyan: blocked.
/// Dim: canceled.
pub fn colorize_status(status: &str) -> StyledObject<&str> {
    match status {
        "completed" => style(status).green().bold(),
        "in_progress" => style(status).yellow(),
        "pending" => style(status).blue(),
        "blocked" => style(status).cyan(),
        "canceled" => style(status).dim(),
        _ => style(status),
    }
}
