use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::app::context::Context;
use crate::app::registry::{CommandArgs, CommandHandler};
use crate::core::archive::ArchiveKind;
use crate::core::fs::{absolutize, complete_path};
use crate::error::{CommandError, Result};

/// Unpack an archive into the current directory.
pub struct ExtractArchive;

impl ExtractArchive {
    /// The typed argument (relative to the working directory), or the entry
    /// under the cursor.
    fn target(ctx: &Context<'_>, args: &CommandArgs) -> Result<PathBuf> {
        let target = match args.rest(1) {
            Some(typed) => absolutize(ctx.cwd(), typed),
            None => ctx
                .host
                .current_file()
                .ok_or_else(|| CommandError::not_applicable("No archive selected"))?,
        };
        if !target.exists() {
            return Err(CommandError::TargetMissing(target));
        }
        Ok(target)
    }
}

#[async_trait]
impl CommandHandler for ExtractArchive {
    fn name(&self) -> &'static str {
        "extract"
    }

    fn usage(&self) -> &'static str {
        ":extract [archive]  Extract an archive into the current directory"
    }

    async fn execute(&self, ctx: &Context<'_>, args: &CommandArgs) -> Result<()> {
        let archive = Self::target(ctx, args)?;
        let kind = ArchiveKind::detect(&archive)
            .ok_or_else(|| CommandError::UnsupportedFormat(archive.clone()))?;

        let extractor = kind.extractor(&archive);
        info!(%extractor, "extracting");
        let output = ctx
            .runner
            .output(&extractor, ctx.cwd(), ctx.config.timeouts.extract)
            .await
            .map_err(CommandError::from_run)?;
        if !output.success() {
            return Err(CommandError::ProcessFailure {
                program: extractor.program,
                diagnostic: output.diagnostic(),
            });
        }

        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive.display().to_string());
        ctx.host.notify(&format!("Extracted: {name}"), false);
        ctx.host
            .reload_current_view()
            .map_err(|e| CommandError::host("reload", e))
    }

    fn complete(&self, ctx: &Context<'_>, partial: &str) -> Vec<String> {
        complete_path(ctx.cwd(), partial)
    }
}
