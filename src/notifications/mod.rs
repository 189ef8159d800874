//! The notification capability.

use heicdrop_common::NoticeKind;
use serde::Serialize;

/// A short user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Shows notices to the user. Fire-and-forget: nothing is acknowledged and
/// delivery problems are the notifier's own business.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Prints notices to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(kind = %notice.kind, "Notice: {}", notice.title);
        eprintln!("{}", format_notice(&notice));
    }
}

fn format_notice(notice: &Notice) -> String {
    let marker = match notice.kind {
        NoticeKind::Info => "•",
        NoticeKind::Destructive => "✗",
    };
    if notice.description.is_empty() {
        format!("{} {}", marker, notice.title)
    } else {
        format!("{} {}: {}", marker, notice.title, notice.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let n = Notice::destructive("Failed to convert a.heic", "bad header");
        assert_eq!(n.kind, NoticeKind::Destructive);
        assert_eq!(n.title, "Failed to convert a.heic");
    }

    #[test]
    fn test_format_notice() {
        assert_eq!(
            format_notice(&Notice::destructive("No HEIC files found", "Pick some")),
            "✗ No HEIC files found: Pick some"
        );
        let info = Notice {
            kind: NoticeKind::Info,
            title: "Cleared".to_string(),
            description: String::new(),
        };
        assert_eq!(format_notice(&info), "• Cleared");
    }
}
