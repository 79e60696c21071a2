//! Rename many files at once by editing their names in `$EDITOR`.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::context::Context;
use crate::app::registry::{CommandArgs, CommandHandler};
use crate::core::rename;
use crate::core::tool::Invocation;
use crate::error::{CommandError, Result};

pub struct BulkRename;

impl BulkRename {
    /// Marked entries, or the entry under the cursor.
    fn targets(ctx: &Context<'_>) -> Result<Vec<PathBuf>> {
        let selection = ctx.host.current_selection();
        if !selection.is_empty() {
            return Ok(selection);
        }
        ctx.host
            .current_file()
            .map(|file| vec![file])
            .ok_or_else(|| CommandError::not_applicable("No files selected"))
    }
}

#[async_trait]
impl CommandHandler for BulkRename {
    fn name(&self) -> &'static str {
        "bulk_rename"
    }

    fn usage(&self) -> &'static str {
        ":bulk_rename  Rename the marked files in your editor"
    }

    async fn execute(&self, ctx: &Context<'_>, _args: &CommandArgs) -> Result<()> {
        let targets = Self::targets(ctx)?;
        let skipped: Vec<&PathBuf> = targets
            .iter()
            .filter(|t| rename::buffer_name(t).is_none())
            .collect();
        for path in &skipped {
            ctx.host.notify(
                &format!("Skipping {}: name is not valid UTF-8", path.display()),
                true,
            );
        }
        if skipped.len() == targets.len() {
            return Err(CommandError::not_applicable("No files can be renamed"));
        }

        // Removed on drop, on every path out of this function.
        let mut buffer = tempfile::Builder::new()
            .prefix("fm-pick-rename-")
            .suffix(".txt")
            .tempfile()?;
        buffer.write_all(rename::buffer_for(&targets).as_bytes())?;
        buffer.flush()?;

        let editor = ctx.config.editor();
        let (program, extra) = editor
            .split_first()
            .ok_or_else(|| CommandError::not_applicable("No editor configured"))?;
        let invocation = Invocation::new(program.as_str())
            .args(extra)
            .arg(buffer.path().as_os_str());

        let status = ctx
            .runner
            .interactive(&invocation, ctx.cwd())
            .await
            .map_err(CommandError::from_run)?;
        if !status.success() {
            return Err(CommandError::ProcessFailure {
                program: program.clone(),
                diagnostic: status.diagnostic(),
            });
        }

        // Editors often replace the file instead of writing in place.
        let edited = std::fs::read_to_string(buffer.path())?;
        let moves = rename::plan(&targets, &edited)?;
        let failures = rename::apply(&moves);

        for (mv, err) in &failures {
            warn!(from = %mv.from.display(), error = %err, "rename failed");
            ctx.host.notify(
                &format!("Failed to rename {}: {err}", mv.from.display()),
                true,
            );
        }
        let renamed = moves.len() - failures.len();
        info!(renamed, failed = failures.len(), "bulk rename done");
        if renamed > 0 {
            ctx.host.notify(&format!("Renamed {renamed} file(s)"), false);
        }
        ctx.host
            .reload_current_view()
            .map_err(|e| CommandError::host("reload", e))
    }
}
