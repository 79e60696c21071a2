//! The picker: enumerate candidates, let the user choose one in the
//! selector, validate it.
//!
//! ```text
//! Idle → Enumerating → Selecting ─┬─ Resolved ─ Validating ─┬─ (caller acts)
//!                                 ├─ Cancelled              └─ Rejected
//!                                 ├─ TimedOut
//!                                 └─ Failed
//! ```
//!
//! Cancelling or letting the selector time out is not an error: callers get
//! `Ok(None)` and simply do nothing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::fs::{absolutize, PathKind};
use super::process::{Feed, PipelineOutcome, Runner};
use super::selector::{
    build_invocation, committed_line, Extract, Preview, SelectorOptions, SelectorStyle,
};
use super::tool::{Invocation, ToolChoice, ToolResolver};
use crate::error::{CommandError, Result};

// ───────────────────────────────────────── request ───────────

/// Where the candidates come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// An enumerator subprocess, with a portable fallback.
    Command(ToolChoice<Invocation>),
    Lines(Vec<String>),
    /// The selector populates itself through its own bindings.
    None,
}

/// Everything one picker run needs.  Lives for a single command invocation.
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub source: CandidateSource,
    pub preview: Option<ToolChoice<Preview>>,
    pub options: SelectorOptions,
    pub extract: Extract,
    pub timeout: Duration,
}

impl SelectionRequest {
    pub fn new(source: CandidateSource, timeout: Duration) -> Self {
        Self {
            source,
            preview: None,
            options: SelectorOptions::default(),
            extract: Extract::Whole,
            timeout,
        }
    }

    pub fn preview(mut self, preview: ToolChoice<Preview>) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn options(mut self, options: SelectorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn extract(mut self, extract: Extract) -> Self {
        self.extract = extract;
        self
    }
}

/// Result of the interactive phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Picked(String),
    Cancelled,
    TimedOut,
}

// ───────────────────────────────────────── picker ────────────

pub struct Picker {
    runner: Arc<dyn Runner>,
    resolver: Arc<dyn ToolResolver>,
    style: SelectorStyle,
    cwd: PathBuf,
}

impl Picker {
    pub fn new(
        runner: Arc<dyn Runner>,
        resolver: Arc<dyn ToolResolver>,
        style: SelectorStyle,
        cwd: PathBuf,
    ) -> Self {
        Self {
            runner,
            resolver,
            style,
            cwd,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Whether a tool the selector runs on its own (reload bindings) is installed.
    pub fn has_tool(&self, tool: &str) -> bool {
        self.resolver.has(tool)
    }

    /// Run the selector and return the extracted value of the committed
    /// line.  Tools are looked up afresh on every call.
    pub async fn select(&self, request: &SelectionRequest) -> Result<Selection> {
        let feed = match &request.source {
            CandidateSource::Command(choice) => {
                let inv = choice
                    .resolve_invocation(self.resolver.as_ref())
                    .ok_or_else(|| missing_tool(choice))?;
                Feed::Command(inv.clone())
            }
            CandidateSource::Lines(lines) => Feed::Lines(lines.clone()),
            CandidateSource::None => Feed::Empty,
        };

        // A preview without a renderer is cosmetic; drop it.
        let preview = request.preview.as_ref().and_then(|choice| {
            choice.resolve(self.resolver.as_ref(), |p| p.binary.as_str())
        });

        if !self.resolver.has(&self.style.program) {
            return Err(CommandError::ToolNotFound(self.style.program.clone()));
        }
        let selector = build_invocation(&self.style, &request.options, preview);

        let outcome = self
            .runner
            .pipeline(&feed, &selector, &self.cwd, request.timeout)
            .await
            .map_err(CommandError::from_pipeline)?;

        let output = match outcome {
            PipelineOutcome::TimedOut => {
                info!(secs = request.timeout.as_secs(), "picker timed out");
                return Ok(Selection::TimedOut);
            }
            PipelineOutcome::Finished(output) => output,
        };
        if !output.success() {
            debug!(code = ?output.code, "selector aborted");
            return Ok(Selection::Cancelled);
        }
        let Some(line) = committed_line(&output.stdout) else {
            return Ok(Selection::Cancelled);
        };
        match request.extract.apply(line) {
            Some(value) => Ok(Selection::Picked(value)),
            None => Err(CommandError::invalid_selection(line.to_string())),
        }
    }

    /// Select a path and check it against `kind`.  The returned path is
    /// absolute.
    pub async fn pick_path(
        &self,
        request: &SelectionRequest,
        kind: PathKind,
    ) -> Result<Option<PathBuf>> {
        let Selection::Picked(value) = self.select(request).await? else {
            return Ok(None);
        };
        let path = absolutize(&self.cwd, &value);
        if !kind.accepts(&path) {
            return Err(CommandError::invalid_selection(format!(
                "{}: {}",
                path.display(),
                kind.describe()
            )));
        }
        Ok(Some(path))
    }

    /// Select a value that must satisfy `valid` (hashes, branch names).
    pub async fn pick_identifier(
        &self,
        request: &SelectionRequest,
        valid: fn(&str) -> bool,
    ) -> Result<Option<String>> {
        let Selection::Picked(value) = self.select(request).await? else {
            return Ok(None);
        };
        if !valid(&value) {
            return Err(CommandError::invalid_selection(value));
        }
        Ok(Some(value))
    }
}

fn missing_tool(choice: &ToolChoice<Invocation>) -> CommandError {
    let program = choice
        .fallback
        .as_ref()
        .unwrap_or(&choice.preferred)
        .program
        .clone();
    CommandError::ToolNotFound(program)
}
