//! The host as seen from a plain shell: effects become payload lines that the
//! wrapping shell function applies after the binary exits.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::app::host::Host;

const CD_PREFIX: &str = "__FP_CD__=";
const SELECT_PREFIX: &str = "__FP_SELECT__=";
const EDIT_PREFIX: &str = "__FP_EDIT__=";
const RUN_PREFIX: &str = "__FP_RUN__=";
const RELOAD_LINE: &str = "__FP_RELOAD__";

/// [`Host`] backed by the invoking shell.
///
/// Cursor and marks come from the command line (`--file`, `--selected`).
/// Effects are written to `out` (stdout in the binary); notifications go to
/// stderr.  `editor` is the resolved editor command, handed to the wrapper
/// with every edit.
pub struct ShellHost<W: Write + Send> {
    current_file: Option<PathBuf>,
    selection: Vec<PathBuf>,
    editor: Vec<String>,
    out: Mutex<W>,
}

impl ShellHost<io::Stdout> {
    pub fn new(
        current_file: Option<PathBuf>,
        selection: Vec<PathBuf>,
        editor: Vec<String>,
    ) -> Self {
        Self::with_writer(current_file, selection, editor, io::stdout())
    }
}

impl<W: Write + Send> ShellHost<W> {
    pub fn with_writer(
        current_file: Option<PathBuf>,
        selection: Vec<PathBuf>,
        editor: Vec<String>,
        out: W,
    ) -> Self {
        Self {
            current_file,
            selection,
            editor,
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|p| p.into_inner())
    }

    /// One payload line.  The wrapper reads line by line, so values must not
    /// contain a newline.
    fn emit(&self, prefix: &str, value: &str) -> io::Result<()> {
        if value.contains('\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "value contains a newline",
            ));
        }
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("payload writer poisoned"))?;
        writeln!(out, "{prefix}{value}")?;
        out.flush()
    }

    fn emit_path(&self, prefix: &str, path: &Path) -> io::Result<()> {
        self.emit(prefix, &path.to_string_lossy())
    }
}

impl<W: Write + Send> Host for ShellHost<W> {
    fn notify(&self, message: &str, is_error: bool) {
        if is_error {
            eprintln!("{}: {message}", env!("CARGO_PKG_NAME"));
        } else {
            eprintln!("{message}");
        }
    }

    fn current_file(&self) -> Option<PathBuf> {
        self.current_file.clone()
    }

    fn current_selection(&self) -> Vec<PathBuf> {
        self.selection.clone()
    }

    fn change_directory(&self, path: &Path) -> io::Result<()> {
        self.emit_path(CD_PREFIX, path)
    }

    fn select_file(&self, path: &Path) -> io::Result<()> {
        self.emit_path(SELECT_PREFIX, path)
    }

    fn reload_current_view(&self) -> io::Result<()> {
        self.emit(RELOAD_LINE, "")
    }

    fn run_host_command(&self, command_line: &str, flags: &str) -> io::Result<()> {
        self.emit(RUN_PREFIX, &format!("{flags}\t{command_line}"))
    }

    fn edit_file(&self, path: &Path) -> io::Result<()> {
        if self.editor.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no editor configured",
            ));
        }
        let editor = self.editor.join(" ");
        self.emit(EDIT_PREFIX, &format!("{editor}\t{}", path.to_string_lossy()))
    }
}

// ───────────────────────────────────────── wrappers ──────────

/// Returns the bash function that users should add to their `.bashrc`.
///
/// The function name is `fp` and it invokes the binary by its package name
/// (read from `Cargo.toml` at compile time).
pub fn bash_function() -> String {
    wrapper("[", "]")
}

/// Returns the zsh function that users should add to their `.zshrc`.
pub fn zsh_function() -> String {
    wrapper("[[", "]]")
}

fn wrapper(open: &str, close: &str) -> String {
    let bin = env!("CARGO_PKG_NAME");
    format!(
        r#"
# ── {bin}: fuzzy pickers for files, directories, bookmarks and git ──
# Usage: fp <command> [args]   (fp --list shows every command)
fp() {{
    local output line exit_code
    local dest="" file="" edit="" editor="" run="" flags=""
    output="$(command {bin} "$@")"
    exit_code=$?
    while IFS= read -r line; do
        case "$line" in
            {CD_PREFIX}*) dest="${{line#{CD_PREFIX}}}" ;;
            {SELECT_PREFIX}*) file="${{line#{SELECT_PREFIX}}}" ;;
            {EDIT_PREFIX}*) edit="${{line#{EDIT_PREFIX}}}" ;;
            {RUN_PREFIX}*) run="${{line#{RUN_PREFIX}}}" ;;
            {RELOAD_LINE}) ;;
            *) {open} -n "$line" {close} && printf '%s\n' "$line" ;;
        esac
    done <<< "$output"
    if {open} -n "$dest" {close} && {open} -d "$dest" {close}; then
        cd "$dest" || return
    fi
    if {open} -n "$file" {close} && {open} -e "$file" {close}; then
        cd "$(dirname "$file")" || return
        printf '%s\n' "$file"
    fi
    if {open} -n "$edit" {close}; then
        editor="${{edit%%$'\t'*}}"
        edit="${{edit#*$'\t'}}"
        eval "$editor \"\$edit\""
    fi
    if {open} -n "$run" {close}; then
        flags="${{run%%$'\t'*}}"
        run="${{run#*$'\t'}}"
        case "$flags" in
            *p*) eval "$run | ${{PAGER:-less -R}}" ;;
            *) eval "$run" ;;
        esac
    fi
    return $exit_code
}}
"#
    )
}
