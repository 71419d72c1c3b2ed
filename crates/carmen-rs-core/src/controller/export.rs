//! Plain-text transcript export.

use carmen_rs_memory::{ChatTurn, TurnRole};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SEPARATOR_WIDTH: usize = 50;

/// Default export file name for the given time.
pub fn default_export_path(exports_dir: &Path, now: DateTime<Local>) -> PathBuf {
    exports_dir.join(format!("carmen_chat_{}.txt", now.format("%Y%m%d_%H%M%S")))
}

/// Render the transcript with a dated header.
pub fn render_export(
    name: &str,
    username: &str,
    mood: &str,
    turns: &[ChatTurn],
    now: DateTime<Local>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{name} Chat Export\n"));
    out.push_str(&format!("Date: {}\n", now.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("Mood: {mood}\n"));
    out.push_str(&"=".repeat(SEPARATOR_WIDTH));
    out.push_str("\n\n");
    for turn in turns {
        let speaker = match turn.role {
            TurnRole::User => username,
            TurnRole::Assistant => name,
            TurnRole::System => "System",
        };
        out.push_str(&format!("{speaker}: {}\n", turn.text));
    }
    out
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_export(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
