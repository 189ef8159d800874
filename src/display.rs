//! Derived display state for the conversion queue.

use crate::queue::ConversionEntry;
use heicdrop_common::EntryStatus;

/// How a status is shown next to a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub icon: &'static str,
    pub label: &'static str,
}

pub fn status_badge(status: EntryStatus) -> StatusBadge {
    match status {
        EntryStatus::Converting => StatusBadge {
            icon: "⟳",
            label: "Converting",
        },
        EntryStatus::Complete => StatusBadge {
            icon: "✓",
            label: "Complete",
        },
        EntryStatus::Failed => StatusBadge {
            icon: "✗",
            label: "Error",
        },
    }
}

/// "Clear completed" is only offered once something has finished.
pub fn show_clear_completed(entries: &[ConversionEntry]) -> bool {
    entries.iter().any(|e| e.status().is_terminal())
}

/// Render the queue as a two-column text table.
///
/// Failed rows get an indented line with the error message. An empty queue
/// renders as an empty string.
pub fn render_table(entries: &[ConversionEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let name_width = entries
        .iter()
        .map(|e| e.file_name().chars().count())
        .max()
        .unwrap_or(0)
        .max("File".len());

    let mut out = String::new();
    out.push_str(&format!("{:<width$}  Status\n", "File", width = name_width));
    out.push_str(&format!("{}  {}\n", "-".repeat(name_width), "-".repeat(12)));

    for entry in entries {
        let badge = status_badge(entry.status());
        out.push_str(&format!(
            "{:<width$}  {} {}\n",
            entry.file_name(),
            badge.icon,
            badge.label,
            width = name_width
        ));
        if let Some(message) = entry.error_message() {
            out.push_str(&format!("{:<width$}    {}\n", "", message, width = name_width));
        }
    }

    out
}
