//! Selector configuration and result extraction.
//!
//! The selector (fzf by default) only ever prints the committed line.  Field
//! extraction happens here, in Rust, instead of through the selector's own
//! placeholder syntax, so delimiters inside file names cannot confuse it.

use tracing::warn;

use super::tool::Invocation;

// ───────────────────────────────────────── style ─────────────

/// User-level look of every picker (from the config file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorStyle {
    pub program: String,
    pub height: String,
    pub layout: String,
    pub border: bool,
}

impl Default for SelectorStyle {
    fn default() -> Self {
        Self {
            program: "fzf".into(),
            height: "50%".into(),
            layout: "reverse".into(),
            border: true,
        }
    }
}

// ───────────────────────────────────────── per-request options ─

/// A preview command template, executed by the selector for the focused
/// line.  `binary` is the tool it needs on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub binary: String,
    pub template: String,
}

impl Preview {
    pub fn new(binary: &str, template: impl Into<String>) -> Self {
        Self {
            binary: binary.to_string(),
            template: template.into(),
        }
    }
}

/// Per-command selector switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorOptions {
    pub header: Option<String>,
    pub query: Option<String>,
    pub preview_window: Option<String>,
    pub delimiter: Option<String>,
    pub with_nth: Option<String>,
    /// Interpret colour escapes in candidates.
    pub ansi: bool,
    /// Turn off local filtering (the candidate list reloads on each change).
    pub disabled: bool,
    pub binds: Vec<String>,
}

impl SelectorOptions {
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Pre-fill the query; empty strings are dropped.
    pub fn query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn preview_window(mut self, window: impl Into<String>) -> Self {
        self.preview_window = Some(window.into());
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_nth(mut self, fields: impl Into<String>) -> Self {
        self.with_nth = Some(fields.into());
        self
    }

    pub fn ansi(mut self) -> Self {
        self.ansi = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn bind(mut self, binding: impl Into<String>) -> Self {
        self.binds.push(binding.into());
        self
    }
}

/// Render the selector argument vector.  Every value travels as a single
/// `--flag=value` argument so a query such as `-x` cannot be read as a flag.
pub fn build_invocation(
    style: &SelectorStyle,
    options: &SelectorOptions,
    preview: Option<&Preview>,
) -> Invocation {
    let mut inv = Invocation::new(style.program.as_str())
        .arg(format!("--height={}", style.height))
        .arg(format!("--layout={}", style.layout));
    if style.border {
        inv = inv.arg("--border");
    }
    if options.ansi {
        inv = inv.arg("--ansi");
    }
    if options.disabled {
        inv = inv.arg("--disabled");
    }
    if let Some(ref header) = options.header {
        inv = inv.arg(format!("--header={header}"));
    }
    if let Some(ref query) = options.query {
        inv = inv.arg(format!("--query={query}"));
    }
    if let Some(ref delimiter) = options.delimiter {
        inv = inv.arg(format!("--delimiter={delimiter}"));
    }
    if let Some(ref fields) = options.with_nth {
        inv = inv.arg(format!("--with-nth={fields}"));
    }
    if let Some(preview) = preview {
        inv = inv.arg(format!("--preview={}", preview.template));
        if let Some(ref window) = options.preview_window {
            inv = inv.arg(format!("--preview-window={window}"));
        }
    }
    for bind in &options.binds {
        inv = inv.arg(format!("--bind={bind}"));
    }
    inv
}

// ───────────────────────────────────────── output ────────────

/// Take the committed line from raw selector stdout.
///
/// Exactly one line is the contract.  If more arrive, the first non-empty one
/// wins and the rest are dropped with a warning.
pub fn committed_line(stdout: &str) -> Option<&str> {
    let mut lines = stdout
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty());
    let first = lines.next()?;
    let extra = lines.count();
    if extra > 0 {
        warn!(extra, "selector returned more than one line; keeping the first");
    }
    Some(first)
}

/// How to turn the committed line into the value the action needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    Whole,
    /// The `n`th (1-based) field.
    Field { delimiter: char, index: usize },
    /// Everything from the `n`th field on, delimiters included.
    Tail { delimiter: char, index: usize },
    /// A `git status --porcelain` line.
    GitPorcelain,
}

impl Extract {
    pub fn apply(self, line: &str) -> Option<String> {
        let line = plain_text(line);
        let value = match self {
            Extract::Whole => line.trim().to_string(),
            Extract::Field { delimiter, index } => line
                .split(delimiter)
                .nth(index.checked_sub(1)?)?
                .trim()
                .to_string(),
            Extract::Tail { delimiter, index } => line
                .splitn(index, delimiter)
                .nth(index.checked_sub(1)?)?
                .trim()
                .to_string(),
            Extract::GitPorcelain => porcelain_path(&line)?,
        };
        (!value.is_empty()).then_some(value)
    }
}

/// The line without colour or hyperlink escapes.  Fields are stripped one at
/// a time so tab delimiters survive.
fn plain_text(line: &str) -> String {
    line.split('\t')
        .map(strip_ansi_escapes::strip_str)
        .collect::<Vec<_>>()
        .join("\t")
}

/// Path of a porcelain v1 status line: `XY path` or `XY old -> new`.
fn porcelain_path(line: &str) -> Option<String> {
    let rest = line.get(3..)?;
    let target = match rest.rsplit_once(" -> ") {
        Some((_, new)) => new,
        None => rest,
    };
    let target = target.trim_end();
    if target.len() >= 2 && target.starts_with('"') && target.ends_with('"') {
        return Some(unquote_c_style(&target[1..target.len() - 1]));
    }
    Some(target.to_string())
}

/// Undo git's C-style quoting (`\"`, `\\`, `\t`, `\n`, octal bytes).
fn unquote_c_style(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let next = bytes[i + 1];
        match next {
            b'0'..=b'7' if is_octal_escape(bytes.get(i + 1..i + 4)) => {
                let value = bytes[i + 1..i + 4]
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                out.push(u8::try_from(value).unwrap_or(b'?'));
                i += 4;
                continue;
            }
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            other => out.push(other),
        }
        i += 2;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_escape(digits: Option<&[u8]>) -> bool {
    digits.is_some_and(|d| d.iter().all(|b| (b'0'..=b'7').contains(b)))
}
