//! External tool identity: argument vectors and `PATH` probing.
//!
//! An [`Invocation`] is a program plus explicit arguments; nothing in this
//! crate ever builds a shell line out of user input.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

// ───────────────────────────────────────── invocation ────────

/// A program and its argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments as lossy strings.
    #[cfg(test)]
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────── resolver ──────────

/// Answers "is this binary installed?" without running it.
pub trait ToolResolver: Send + Sync {
    fn resolve(&self, tool: &str) -> Option<PathBuf>;

    fn has(&self, tool: &str) -> bool {
        self.resolve(tool).is_some()
    }
}

/// Looks tools up on `PATH`.  Deliberately uncached: a tool may be installed
/// or removed between two invocations.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

impl ToolResolver for PathResolver {
    fn resolve(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

// ───────────────────────────────────────── preferred / fallback ─

/// A preferred tool with a portable fallback, e.g. `fd` then `find`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolChoice<T> {
    pub preferred: T,
    pub fallback: Option<T>,
}

impl<T> ToolChoice<T> {
    pub fn new(preferred: T, fallback: T) -> Self {
        Self {
            preferred,
            fallback: Some(fallback),
        }
    }

    pub fn only(preferred: T) -> Self {
        Self {
            preferred,
            fallback: None,
        }
    }

    /// Pick the first option whose binary is present.  `binary` names the
    /// program each option depends on.
    pub fn resolve<'a>(
        &'a self,
        resolver: &dyn ToolResolver,
        binary: impl Fn(&T) -> &str,
    ) -> Option<&'a T> {
        if resolver.has(binary(&self.preferred)) {
            return Some(&self.preferred);
        }
        self.fallback
            .as_ref()
            .filter(|fallback| resolver.has(binary(fallback)))
    }
}

impl ToolChoice<Invocation> {
    pub fn resolve_invocation(&self, resolver: &dyn ToolResolver) -> Option<&Invocation> {
        self.resolve(resolver, |inv| inv.program.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeResolver;

    fn fd_or_find() -> ToolChoice<Invocation> {
        ToolChoice::new(
            Invocation::new("fd").args(["--type", "f"]),
            Invocation::new("find").args([".", "-type", "f"]),
        )
    }

    #[test]
    fn test_prefers_installed_tool() {
        let resolver = FakeResolver::with(&["fd", "find"]);
        let choice = fd_or_find();
        assert_eq!(choice.resolve_invocation(&resolver).unwrap().program, "fd");
    }

    #[test]
    fn test_falls_back_when_preferred_missing() {
        let resolver = FakeResolver::with(&["find"]);
        let choice = fd_or_find();
        let picked = choice.resolve_invocation(&resolver).unwrap();
        assert_eq!(picked.program, "find");
        assert_eq!(picked.arg_strings(), vec![".", "-type", "f"]);
    }

    #[test]
    fn test_nothing_installed() {
        let resolver = FakeResolver::with(&[]);
        assert!(fd_or_find().resolve_invocation(&resolver).is_none());
        assert!(ToolChoice::only(Invocation::new("git"))
            .resolve_invocation(&resolver)
            .is_none());
    }

    #[test]
    fn test_display_joins_args() {
        let inv = Invocation::new("tar").args(["xzf", "a.tgz"]);
        assert_eq!(inv.to_string(), "tar xzf a.tgz");
    }
}
