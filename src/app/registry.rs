//! Command registry: maps a typed command name to its handler.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, info};

use super::context::Context;
use crate::error::{CommandError, Result};

// ───────────────────────────────────────── arguments ─────────

/// A typed command line, e.g. `extract my archive.zip`.
///
/// Word 0 is the command name.  [`rest`](Self::rest) keeps the typed
/// spacing so file names with spaces survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    line: String,
    /// Byte offset and text of each whitespace-separated word.
    words: Vec<(usize, String)>,
}

impl CommandArgs {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_start().to_string();
        let mut words = Vec::new();
        let mut start = None;
        for (idx, ch) in line.char_indices() {
            match (ch.is_whitespace(), start) {
                (false, None) => start = Some(idx),
                (true, Some(s)) => {
                    words.push((s, line[s..idx].to_string()));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            words.push((s, line[s..].to_string()));
        }
        Self { line, words }
    }

    pub fn name(&self) -> &str {
        self.arg(0).unwrap_or_default()
    }

    /// The `n`th word, if present.
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.words.get(n).map(|(_, w)| w.as_str())
    }

    /// Everything from word `n` to the end of the line, trailing space
    /// trimmed.  `None` when there is no such word.
    pub fn rest(&self, n: usize) -> Option<&str> {
        self.words
            .get(n)
            .map(|&(offset, _)| self.line[offset..].trim_end())
    }
}

// ───────────────────────────────────────── handler ───────────

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Name typed by the user.
    fn name(&self) -> &'static str;

    /// One-line help, e.g. `":extract [archive]  Extract an archive"`.
    fn usage(&self) -> &'static str;

    async fn execute(&self, ctx: &Context<'_>, args: &CommandArgs) -> Result<()>;

    /// Tab-completion candidates for the argument being typed.
    fn complete(&self, _ctx: &Context<'_>, _partial: &str) -> Vec<String> {
        Vec::new()
    }
}

// ───────────────────────────────────────── registry ──────────

#[derive(Default)]
pub struct Registry {
    handlers: BTreeMap<&'static str, Box<dyn CommandHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler; a later registration under the same name replaces the
    /// earlier one.
    pub fn register(&mut self, handler: impl CommandHandler + 'static) -> &mut Self {
        self.handlers.insert(handler.name(), Box::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    /// `(name, usage)` for every command, sorted by name.
    pub fn usages(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.handlers.iter().map(|(name, h)| (*name, h.usage()))
    }

    /// Run the command typed on `line`.  Any failure is reported to the host
    /// as an error notification and also returned.
    pub async fn dispatch(&self, ctx: &Context<'_>, line: &str) -> Result<()> {
        let args = CommandArgs::parse(line);
        let result = match self.get(args.name()) {
            Some(handler) => {
                debug!(command = handler.name(), line, "dispatching");
                handler.execute(ctx, &args).await
            }
            None => Err(CommandError::UnknownCommand(args.name().to_string())),
        };
        if let Err(ref e) = result {
            info!(command = args.name(), error = %e, "command failed");
            ctx.host.notify(&e.to_string(), true);
        }
        result
    }

    /// Complete a partially typed command line.  Results are whole lines.
    pub fn complete(&self, ctx: &Context<'_>, line: &str) -> Vec<String> {
        let args = CommandArgs::parse(line);
        let typing_name = !line.trim_start().contains(char::is_whitespace);
        if typing_name {
            let prefix = args.name();
            return self
                .handlers
                .keys()
                .filter(|name| name.starts_with(prefix))
                .map(|name| name.to_string())
                .collect();
        }
        let Some(handler) = self.get(args.name()) else {
            return Vec::new();
        };
        let partial = args.rest(1).unwrap_or_default();
        handler
            .complete(ctx, partial)
            .into_iter()
            .map(|c| format!("{} {c}", handler.name()))
            .collect()
    }
}
