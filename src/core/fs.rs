//! Filesystem helpers: path resolution, validation and directory-content
//! completion.
//!
//! Completion walks a single directory level with the [`ignore`] crate so it
//! behaves like the rest of the toolchain (hidden entries skipped unless
//! asked for).

use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;

/// Marker whose presence in the working directory enables git commands.
pub const REPO_MARKER: &str = ".git";

/// What a selected path must be before an action may use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    /// File, directory, or anything else that exists.
    Existing,
}

impl PathKind {
    pub fn accepts(self, path: &Path) -> bool {
        match self {
            PathKind::File => path.is_file(),
            PathKind::Directory => path.is_dir(),
            PathKind::Existing => path.exists(),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            PathKind::File => "not a file",
            PathKind::Directory => "not a directory",
            PathKind::Existing => "does not exist",
        }
    }
}

/// Resolve `candidate` against `cwd`, dropping `.` components so that
/// `./a.txt` from `find` and `a.txt` from `fd` land on the same path.
pub fn absolutize(cwd: &Path, candidate: &str) -> PathBuf {
    let relative = Path::new(candidate);
    let base = if relative.is_absolute() {
        PathBuf::new()
    } else {
        cwd.to_path_buf()
    };
    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .fold(base, |mut acc, c| {
            acc.push(c.as_os_str());
            acc
        })
}

pub fn is_repository(cwd: &Path) -> bool {
    cwd.join(REPO_MARKER).exists()
}

/// `~` and `~/...` expansion against `$HOME`.
pub fn expand_home(raw: &str) -> PathBuf {
    let home = || std::env::var("HOME").map(PathBuf::from).ok();
    if raw == "~" {
        if let Some(home) = home() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = home() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Complete `partial` from directory content.
///
/// The partial's parent (relative to `cwd`) is scanned one level deep.
/// Entries whose names start with the final component are returned as
/// `parent/name`, directories with a trailing `/`.  Hidden entries appear only
/// when the final component itself starts with `.`.  Directories come first,
/// each group sorted case-insensitively.
pub fn complete_path(cwd: &Path, partial: &str) -> Vec<String> {
    let (dir_part, name_part) = match partial.rfind('/') {
        Some(idx) => (&partial[..=idx], &partial[idx + 1..]),
        None => ("", partial),
    };
    let scan_dir = if dir_part.is_empty() {
        cwd.to_path_buf()
    } else if Path::new(dir_part).is_absolute() {
        PathBuf::from(dir_part)
    } else {
        expand_or_join(cwd, dir_part)
    };
    if !scan_dir.is_dir() {
        return Vec::new();
    }

    let walker = WalkBuilder::new(&scan_dir)
        .max_depth(Some(1)) // only immediate children
        .hidden(!name_part.starts_with('.'))
        .git_ignore(false)
        .ignore(false)
        .parents(false)
        .build();

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if path == scan_dir {
            continue;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !name.starts_with(name_part) {
            continue;
        }
        if path.is_dir() {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }

    dirs.sort_by_key(|n| n.to_lowercase());
    files.sort_by_key(|n| n.to_lowercase());

    dirs.into_iter()
        .map(|d| format!("{dir_part}{d}/"))
        .chain(files.into_iter().map(|f| format!("{dir_part}{f}")))
        .collect()
}

fn expand_or_join(cwd: &Path, dir_part: &str) -> PathBuf {
    if dir_part.starts_with('~') {
        expand_home(dir_part)
    } else {
        cwd.join(dir_part)
    }
}
