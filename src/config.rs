//! User configuration: selector look, timeouts, editor and bookmarks.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/fm-pick/config.toml` (default `~/.config/fm-pick/config.toml`).

use std::path::PathBuf;
use std::time::Duration;

use crate::core::fs::expand_home;
use crate::core::selector::SelectorStyle;

// ───────────────────────────────────────── timeouts ──────────

/// Upper bounds for each class of subprocess wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// File and content pickers, git log.
    pub select: Duration,
    /// Directory, bookmark, git status and branch pickers.
    pub navigate: Duration,
    /// Archive extraction.
    pub extract: Duration,
    /// Non-interactive git follow-ups (checkout).
    pub git: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            select: Duration::from_secs(60),
            navigate: Duration::from_secs(30),
            extract: Duration::from_secs(300),
            git: Duration::from_secs(60),
        }
    }
}

// ───────────────────────────────────────── bookmarks ─────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub name: String,
    pub path: PathBuf,
}

impl Bookmark {
    fn new(name: &str, raw_path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: expand_home(raw_path),
        }
    }
}

/// Raw (unexpanded) defaults, kept as written so `serialise` stays readable.
const DEFAULT_BOOKMARKS: &[(&str, &str)] = &[
    ("Home", "~"),
    ("Downloads", "~/Downloads"),
    ("Projects", "~/Projects"),
    ("Documents", "~/Documents"),
    ("Pictures", "~/Pictures"),
    ("Videos", "~/Videos"),
    ("Config", "~/.config"),
    ("Root", "/"),
    ("Etc", "/etc"),
    ("Tmp", "/tmp"),
];

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub selector: SelectorStyle,
    pub timeouts: Timeouts,
    /// Editor used when `$EDITOR` is unset.
    pub editor_fallback: String,
    /// `$EDITOR` as seen by [`load`](Self::load); never persisted.
    pub env_editor: Option<String>,
    /// Bookmarks as `(name, raw path)`; expanded on use.
    bookmarks: Vec<(String, String)>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            selector: SelectorStyle::default(),
            timeouts: Timeouts::default(),
            editor_fallback: "vi".into(),
            env_editor: None,
            bookmarks: DEFAULT_BOOKMARKS
                .iter()
                .map(|(n, p)| (n.to_string(), p.to_string()))
                .collect(),
        }
    }
}

impl AppConfig {
    /// The editor command: `$EDITOR` if set and non-blank, else the fallback.
    /// Whitespace splits program from arguments (`code -w`).
    pub fn editor(&self) -> Vec<String> {
        let raw = self
            .env_editor
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(self.editor_fallback.as_str());
        raw.split_whitespace().map(str::to_string).collect()
    }

    /// Bookmarks with `~` expanded, in configured order.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.bookmarks
            .iter()
            .map(|(name, raw)| Bookmark::new(name, raw))
            .collect()
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults, and pick up
    /// `$EDITOR`.
    pub fn load() -> Self {
        let path = config_path();
        let mut config = std::fs::read_to_string(&path)
            .map(|contents| Self::parse(&contents))
            .unwrap_or_default();
        config.env_editor = std::env::var("EDITOR").ok();
        config
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(path)
    }

    pub fn parse(s: &str) -> Self {
        let mut config = Self::default();
        let mut bookmarks = Vec::new();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            if let Some(name) = key.strip_prefix("bookmark.") {
                // Tabs separate name from path in the picker.
                if !name.is_empty() && !name.contains('\t') && !value.is_empty() {
                    bookmarks.push((name.to_string(), value.to_string()));
                }
                continue;
            }

            match key {
                "selector" if !value.is_empty() => config.selector.program = value.to_string(),
                "height" if !value.is_empty() => config.selector.height = value.to_string(),
                "layout" if !value.is_empty() => config.selector.layout = value.to_string(),
                "border" => config.selector.border = value == "true",
                "editor" if !value.is_empty() => config.editor_fallback = value.to_string(),
                "timeout_select" => set_secs(&mut config.timeouts.select, value),
                "timeout_navigate" => set_secs(&mut config.timeouts.navigate, value),
                "timeout_extract" => set_secs(&mut config.timeouts.extract, value),
                "timeout_git" => set_secs(&mut config.timeouts.git, value),
                _ => {}
            }
        }

        if !bookmarks.is_empty() {
            config.bookmarks = bookmarks;
        }
        config
    }

    pub fn serialise(&self) -> String {
        let mut lines = vec![
            "# fm-pick configuration".to_string(),
            String::new(),
            "# Selector".to_string(),
            format!("selector = {}", self.selector.program),
            format!("height = {}", self.selector.height),
            format!("layout = {}", self.selector.layout),
            format!("border = {}", self.selector.border),
            String::new(),
            "# Fallback when $EDITOR is unset".to_string(),
            format!("editor = {}", self.editor_fallback),
            String::new(),
            "# Timeouts in seconds (5-3600)".to_string(),
            format!("timeout_select = {}", self.timeouts.select.as_secs()),
            format!("timeout_navigate = {}", self.timeouts.navigate.as_secs()),
            format!("timeout_extract = {}", self.timeouts.extract.as_secs()),
            format!("timeout_git = {}", self.timeouts.git.as_secs()),
            String::new(),
            "# Bookmarks: bookmark.<Name> = <path>".to_string(),
        ];
        for (name, raw) in &self.bookmarks {
            lines.push(format!("bookmark.{name} = {raw}"));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

fn set_secs(slot: &mut Duration, value: &str) {
    if let Ok(v) = value.parse::<u64>() {
        // Keep waits bounded in both directions.
        *slot = Duration::from_secs(v.clamp(5, 3600));
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/fm-pick/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}
