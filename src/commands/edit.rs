use async_trait::async_trait;

use crate::app::context::Context;
use crate::app::registry::{CommandArgs, CommandHandler};
use crate::core::fs::{absolutize, complete_path};
use crate::error::{CommandError, Result};

/// Open a file in the host's editor.
pub struct Edit;

#[async_trait]
impl CommandHandler for Edit {
    fn name(&self) -> &'static str {
        "edit"
    }

    fn usage(&self) -> &'static str {
        ":edit [file]  Open a file in the editor"
    }

    async fn execute(&self, ctx: &Context<'_>, args: &CommandArgs) -> Result<()> {
        let target = match args.rest(1) {
            Some(typed) => absolutize(ctx.cwd(), typed),
            None => ctx
                .host
                .current_file()
                .ok_or_else(|| CommandError::not_applicable("No file selected"))?,
        };
        if !target.exists() {
            return Err(CommandError::TargetMissing(target));
        }
        ctx.host
            .edit_file(&target)
            .map_err(|e| CommandError::host("edit", e))
    }

    fn complete(&self, ctx: &Context<'_>, partial: &str) -> Vec<String> {
        complete_path(ctx.cwd(), partial)
    }
}
