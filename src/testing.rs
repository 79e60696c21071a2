//! Test doubles for the tool, runner and host seams.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::host::Host;
use crate::core::process::{Feed, PipelineOutcome, ProcessOutput, RunError, Runner};
use crate::core::tool::{Invocation, ToolResolver};

// ───────────────────────────────────────── resolver ──────────

pub struct FakeResolver {
    installed: HashSet<String>,
}

impl FakeResolver {
    pub fn with(tools: &[&str]) -> Self {
        Self {
            installed: tools.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ToolResolver for FakeResolver {
    fn resolve(&self, tool: &str) -> Option<PathBuf> {
        self.installed
            .contains(tool)
            .then(|| PathBuf::from("/usr/bin").join(tool))
    }
}

// ───────────────────────────────────────── runner ────────────

/// One recorded subprocess request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Output(Invocation),
    Pipeline { feed: Feed, selector: Invocation },
    Interactive(Invocation),
}

type Script<T> = Mutex<VecDeque<Result<T, RunError>>>;

/// Replays scripted results in order and records every call.
#[derive(Default)]
pub struct FakeRunner {
    pub calls: Mutex<Vec<Call>>,
    outputs: Script<ProcessOutput>,
    pipelines: Script<PipelineOutcome>,
    interactives: Script<ProcessOutput>,
    /// Run against the editor's file argument before it "exits".
    editor: Mutex<Option<Box<dyn FnMut(&Path) + Send>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_output(&self, result: Result<ProcessOutput, RunError>) -> &Self {
        self.outputs.lock().unwrap().push_back(result);
        self
    }

    pub fn push_pipeline(&self, result: Result<PipelineOutcome, RunError>) -> &Self {
        self.pipelines.lock().unwrap().push_back(result);
        self
    }

    /// Script how the next interactive child (the editor) exits.
    pub fn push_interactive(&self, result: Result<ProcessOutput, RunError>) -> &Self {
        self.interactives.lock().unwrap().push_back(result);
        self
    }

    /// Script a selector that commits `line`.
    pub fn picks(&self, line: &str) -> &Self {
        self.push_pipeline(Ok(PipelineOutcome::Finished(ok_output(&format!("{line}\n")))))
    }

    pub fn on_edit(&self, edit: impl FnMut(&Path) + Send + 'static) -> &Self {
        *self.editor.lock().unwrap() = Some(Box::new(edit));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Runner for FakeRunner {
    async fn output(
        &self,
        inv: &Invocation,
        _cwd: &Path,
        _timeout: Duration,
    ) -> Result<ProcessOutput, RunError> {
        self.calls.lock().unwrap().push(Call::Output(inv.clone()));
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ok_output("")))
    }

    async fn pipeline(
        &self,
        feed: &Feed,
        selector: &Invocation,
        _cwd: &Path,
        _timeout: Duration,
    ) -> Result<PipelineOutcome, RunError> {
        self.calls.lock().unwrap().push(Call::Pipeline {
            feed: feed.clone(),
            selector: selector.clone(),
        });
        self.pipelines
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PipelineOutcome::Finished(failed_output(130, ""))))
    }

    async fn interactive(&self, inv: &Invocation, _cwd: &Path) -> Result<ProcessOutput, RunError> {
        self.calls.lock().unwrap().push(Call::Interactive(inv.clone()));
        if let Some(edit) = self.editor.lock().unwrap().as_mut() {
            if let Some(file) = inv.args.last() {
                edit(Path::new(file));
            }
        }
        self.interactives
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ok_output("")))
    }
}

pub fn ok_output(stdout: &str) -> ProcessOutput {
    ProcessOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed_output(code: i32, stderr: &str) -> ProcessOutput {
    ProcessOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

pub fn not_found(program: &str) -> RunError {
    RunError::Spawn {
        program: program.to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory (os error 2)"),
    }
}

// ───────────────────────────────────────── host ──────────────

/// One recorded host effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify { message: String, is_error: bool },
    ChangeDirectory(PathBuf),
    SelectFile(PathBuf),
    Reload,
    RunHostCommand { command_line: String, flags: String },
    EditFile(PathBuf),
}

#[derive(Default)]
pub struct RecordingHost {
    pub current_file: Option<PathBuf>,
    pub selection: Vec<PathBuf>,
    effects: Mutex<Vec<Effect>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Notify {
                    message,
                    is_error: true,
                } => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, effect: Effect) -> io::Result<()> {
        self.effects.lock().unwrap().push(effect);
        Ok(())
    }
}

impl Host for RecordingHost {
    fn notify(&self, message: &str, is_error: bool) {
        let _ = self.record(Effect::Notify {
            message: message.to_string(),
            is_error,
        });
    }

    fn current_file(&self) -> Option<PathBuf> {
        self.current_file.clone()
    }

    fn current_selection(&self) -> Vec<PathBuf> {
        self.selection.clone()
    }

    fn change_directory(&self, path: &Path) -> io::Result<()> {
        self.record(Effect::ChangeDirectory(path.to_path_buf()))
    }

    fn select_file(&self, path: &Path) -> io::Result<()> {
        self.record(Effect::SelectFile(path.to_path_buf()))
    }

    fn reload_current_view(&self) -> io::Result<()> {
        self.record(Effect::Reload)
    }

    fn run_host_command(&self, command_line: &str, flags: &str) -> io::Result<()> {
        self.record(Effect::RunHostCommand {
            command_line: command_line.to_string(),
            flags: flags.to_string(),
        })
    }

    fn edit_file(&self, path: &Path) -> io::Result<()> {
        self.record(Effect::EditFile(path.to_path_buf()))
    }
}
