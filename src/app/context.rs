//! Everything a command can reach during one invocation.

use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::picker::Picker;
use crate::core::process::Runner;
use crate::core::tool::ToolResolver;

use super::host::Host;

pub struct Context<'a> {
    pub host: &'a dyn Host,
    pub config: &'a AppConfig,
    pub picker: Picker,
    /// Runner for action-side subprocesses (extractors, checkout, editor).
    pub runner: Arc<dyn Runner>,
}

impl<'a> Context<'a> {
    pub fn new(
        host: &'a dyn Host,
        config: &'a AppConfig,
        runner: Arc<dyn Runner>,
        resolver: Arc<dyn ToolResolver>,
        cwd: std::path::PathBuf,
    ) -> Self {
        let picker = Picker::new(runner.clone(), resolver, config.selector.clone(), cwd);
        Self {
            host,
            config,
            picker,
            runner,
        }
    }

    pub fn cwd(&self) -> &Path {
        self.picker.cwd()
    }
}
