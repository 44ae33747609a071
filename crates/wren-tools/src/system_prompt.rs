//! System prompt assembly: the ambient-info section every agent turn is
//! primed with, plus a short reminders footer.

use std::path::Path;

/// Assemble the system prompt's ambient-info section for a session rooted
/// at `workspace_root`: timestamp, OS/arch, temp directory, and cwd,
/// followed by operating reminders.
#[must_use]
pub fn assemble_system_prompt(workspace_root: &Path) -> String {
    let timestamp = wren_core::now().to_rfc3339();
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    let temp_dir = std::env::temp_dir();

    let ambient = format!(
        "# Environment\n\
         - Current time: {timestamp}\n\
         - Platform: {os} ({arch})\n\
         - Working directory: {cwd}\n\
         - Temp directory: {temp}\n\n",
        cwd = workspace_root.display(),
        temp = temp_dir.display(),
    );
    ambient + REMINDERS
}

const REMINDERS: &str = "\
# Reminders
- Only call a tool when it is necessary to answer the request.
- A tool error is not fatal — read it and decide whether to retry, adjust, or report it to the user.
- Delegate to a sub-agent only for work that genuinely benefits from a separate context.";
