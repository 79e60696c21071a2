//! The file manager as seen from a command.
//!
//! Commands never touch navigation state directly; they ask the host.  The
//! binary's implementation lives in [`crate::shell::integration`].

use std::io;
use std::path::{Path, PathBuf};

pub trait Host: Send + Sync {
    /// Show a message; `is_error` marks it as a failure.
    fn notify(&self, message: &str, is_error: bool);

    /// The entry under the cursor, if any.
    fn current_file(&self) -> Option<PathBuf>;

    /// Marked entries; empty when nothing is marked.
    fn current_selection(&self) -> Vec<PathBuf>;

    fn change_directory(&self, path: &Path) -> io::Result<()>;

    /// Move the cursor to `path`, entering its parent directory.
    fn select_file(&self, path: &Path) -> io::Result<()>;

    fn reload_current_view(&self) -> io::Result<()>;

    /// Run one of the host's own command lines.  `flags` follow the host's
    /// conventions (e.g. `p` pipes output through a pager).
    fn run_host_command(&self, command_line: &str, flags: &str) -> io::Result<()>;

    fn edit_file(&self, path: &Path) -> io::Result<()>;
}
