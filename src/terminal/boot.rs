//! Boot sequence and the delays the terminal waits on.

use std::time::Duration;

use super::message::Message;

pub const BANNER: &str = r"
 _   _                      _   _     _       _
| \ | | ___ _   _ _ __ __ _| | | |   (_)_ __ | | __
|  \| |/ _ \ | | | '__/ _` | | | |   | | '_ \| |/ /
| |\  |  __/ |_| | | | (_| | | | |___| | | | |   <
|_| \_|\___|\__,_|_|  \__,_|_| |_____|_|_| |_|_|\_\
";

pub const BOOT_LINES: &[&str] = &[
    "> Initializing secure connection...",
    "> Loading user profile: Peter Guan",
    "> Stack: Next.js 15 / FastAPI / Python / Ollama",
    "> Access granted.",
    "> Welcome to peterguan.dev",
];

/// Boot output in display order: banner first, then status lines.
pub fn boot_messages() -> Vec<Message> {
    std::iter::once(Message::logo(BANNER.trim_matches('\n')))
        .chain(BOOT_LINES.iter().map(|line| Message::system(*line)))
        .collect()
}

/// Delays between terminal outputs. Only their ordering matters to the
/// engine; the values are there for the feel of a real terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Before the banner.
    pub boot_first_line: Duration,
    /// Between boot lines.
    pub boot_interval: Duration,
    /// After the last boot line, before the quick-action marker.
    pub navigation_marker: Duration,
    /// Before a restricted command is refused.
    pub denial: Duration,
    /// Between "Navigating to ..." and the page change.
    pub navigate: Duration,
}

impl Timings {
    /// No waiting at all.
    pub fn instant() -> Self {
        Self {
            boot_first_line: Duration::ZERO,
            boot_interval: Duration::ZERO,
            navigation_marker: Duration::ZERO,
            denial: Duration::ZERO,
            navigate: Duration::ZERO,
        }
    }

    /// Delay before the boot line at `index`.
    pub fn boot_delay(&self, index: usize) -> Duration {
        if index == 0 {
            self.boot_first_line
        } else {
            self.boot_interval
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            boot_first_line: Duration::from_millis(100),
            boot_interval: Duration::from_millis(500),
            navigation_marker: Duration::from_millis(400),
            denial: Duration::from_millis(200),
            navigate: Duration::from_millis(500),
        }
    }
}
