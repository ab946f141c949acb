//! Status badge styling.

use crate::models::DocumentStatus;

/// Visual style of a status badge. Unknown statuses get [`StatusStyle::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Success,
    Warning,
    Neutral,
    Danger,
    Default,
}

impl StatusStyle {
    pub fn for_status(status: &DocumentStatus) -> Self {
        match status {
            DocumentStatus::Completed => StatusStyle::Success,
            DocumentStatus::Processing => StatusStyle::Warning,
            DocumentStatus::Pending => StatusStyle::Neutral,
            DocumentStatus::Failed => StatusStyle::Danger,
            DocumentStatus::Unknown(_) => StatusStyle::Default,
        }
    }

    fn ansi_code(self) -> &'static str {
        match self {
            StatusStyle::Success => "32",
            StatusStyle::Warning => "33",
            StatusStyle::Neutral => "90",
            StatusStyle::Danger => "31",
            StatusStyle::Default => "0",
        }
    }
}

/// `[status]`, colored with ANSI escapes when `color` is set.
pub fn badge(status: &DocumentStatus, color: bool) -> String {
    let style = StatusStyle::for_status(status);
    if color && style != StatusStyle::Default {
        format!("\x1b[{}m[{}]\x1b[0m", style.ansi_code(), status)
    } else {
        format!("[{}]", status)
    }
}

/// Color only when stdout is a terminal.
pub fn color_enabled() -> bool {
    atty::is(atty::Stream::Stdout)
}
