//! Bulk rename planning and application.
//!
//! The edited buffer must hold exactly one line per target.  A mismatch
//! rejects the whole batch before anything is renamed; once renaming starts,
//! each failure is reported on its own and the rest still proceed.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::CommandError;

/// One rename: `from` → `to`, both absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Name of `path` as written in the buffer.  Names that are not valid UTF-8
/// cannot round-trip through a text editor and have none.
pub fn buffer_name(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()
}

/// Buffer contents for `targets`: one base name per line.  Targets without a
/// [`buffer_name`] are left out.
pub fn buffer_for(targets: &[PathBuf]) -> String {
    let mut out = String::new();
    for name in targets.iter().filter_map(|t| buffer_name(t)) {
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// Pair each buffered target with its edited line.
///
/// Lines are taken verbatim apart from the line terminator, so names with
/// surrounding spaces survive an untouched buffer.  Trailing empty lines
/// (editors like to add one) are ignored before counting.  Empty or
/// unchanged lines leave that target alone.
pub fn plan(targets: &[PathBuf], edited: &str) -> Result<Vec<Move>, CommandError> {
    let named: Vec<(&PathBuf, &str)> = targets
        .iter()
        .filter_map(|t| Some((t, buffer_name(t)?)))
        .collect();
    let mut lines: Vec<&str> = edited
        .lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.len() != named.len() {
        return Err(CommandError::CountMismatch {
            lines: lines.len(),
            files: named.len(),
        });
    }

    Ok(named
        .into_iter()
        .zip(lines)
        .filter(|((_, old), new)| !new.is_empty() && new != old)
        .map(|((target, _), new)| Move {
            from: target.clone(),
            to: target.parent().unwrap_or(Path::new("")).join(new),
        })
        .collect())
}

/// Apply every move, collecting failures instead of stopping.  An existing
/// destination is a failure rather than something to overwrite.
pub fn apply(moves: &[Move]) -> Vec<(Move, io::Error)> {
    let mut failures = Vec::new();
    for mv in moves {
        let result = if mv.to.exists() {
            Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", mv.to.display()),
            ))
        } else {
            std::fs::rename(&mv.from, &mv.to)
        };
        if let Err(e) = result {
            failures.push((mv.clone(), e));
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn targets(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|n| {
                let p = dir.join(n);
                fs::write(&p, n).unwrap();
                p
            })
            .collect()
    }

    #[test]
    fn test_buffer_lists_base_names() {
        let files = vec![PathBuf::from("/a/one.txt"), PathBuf::from("/b/two")];
        assert_eq!(buffer_for(&files), "one.txt\ntwo\n");
    }

    #[test]
    fn test_plan_skips_unchanged_and_blank() {
        let dir = TempDir::new().unwrap();
        let files = targets(dir.path(), &["a", "b", "c"]);
        let moves = plan(&files, "a\n\nC\n\n").unwrap();
        assert_eq!(
            moves,
            vec![Move {
                from: dir.path().join("c"),
                to: dir.path().join("C"),
            }]
        );
    }

    #[test]
    fn test_untouched_buffer_keeps_padded_names() {
        let dir = TempDir::new().unwrap();
        let files = targets(dir.path(), &["notes.txt ", " lead", "plain"]);
        let buffer = buffer_for(&files);
        assert_eq!(buffer, "notes.txt \n lead\nplain\n");

        let moves = plan(&files, &buffer).unwrap();
        assert!(moves.is_empty(), "{moves:?}");

        let moves = plan(&files, "notes.txt\r\n lead\r\nplain\r\n").unwrap();
        assert_eq!(
            moves,
            vec![Move {
                from: dir.path().join("notes.txt "),
                to: dir.path().join("notes.txt"),
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_stay_out_of_the_buffer() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let odd = PathBuf::from("/x").join(OsStr::from_bytes(b"caf\xe9"));
        let files = vec![PathBuf::from("/x/a"), odd, PathBuf::from("/x/b")];
        assert_eq!(buffer_for(&files), "a\nb\n");

        let moves = plan(&files, "a2\nb\n").unwrap();
        assert_eq!(
            moves,
            vec![Move {
                from: PathBuf::from("/x/a"),
                to: PathBuf::from("/x/a2"),
            }]
        );
    }

    #[test]
    fn test_plan_count_mismatch() {
        let files = vec![PathBuf::from("/x/a"), PathBuf::from("/x/b")];
        let err = plan(&files, "only-one\n").unwrap_err();
        assert!(matches!(err, CommandError::CountMismatch { lines: 1, files: 2 }));
    }

    #[test]
    fn test_apply_continues_after_failure() {
        let dir = TempDir::new().unwrap();
        let files = targets(dir.path(), &["a", "b", "taken"]);
        let moves = plan(&files, "taken\nb2\ntaken\n").unwrap();
        let failures = apply(&moves);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.from, dir.path().join("a"));
        assert_eq!(failures[0].1.kind(), io::ErrorKind::AlreadyExists);
        assert!(dir.path().join("a").exists());
        assert!(dir.path().join("b2").exists());
        assert!(!dir.path().join("b").exists());
    }
}
