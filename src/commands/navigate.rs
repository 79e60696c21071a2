//! Fuzzy navigation: files, file contents, directories, bookmarks.

use async_trait::async_trait;

use crate::app::context::Context;
use crate::app::registry::{CommandArgs, CommandHandler};
use crate::core::fs::PathKind;
use crate::core::picker::{CandidateSource, SelectionRequest};
use crate::core::selector::{Extract, Preview, SelectorOptions};
use crate::core::tool::{Invocation, ToolChoice};
use crate::error::{CommandError, Result};

const RG_RELOAD: &str = "rg --column --line-number --no-heading --color=always --smart-case {q} || true";

/// `fd` when installed, else a `find` that skips dot-paths.
fn entries_of_type(kind: &str) -> ToolChoice<Invocation> {
    ToolChoice::new(
        Invocation::new("fd").args(["--type", kind, "--hidden", "--follow", "--exclude", ".git"]),
        Invocation::new("find").args([".", "-type", kind, "-not", "-path", "*/.*"]),
    )
}

fn file_preview() -> ToolChoice<Preview> {
    ToolChoice::new(
        Preview::new("bat", "bat --color=always --style=numbers --line-range=:500 {}"),
        Preview::new("head", "head -50 {}"),
    )
}

fn dir_preview(field: &str) -> ToolChoice<Preview> {
    ToolChoice::only(Preview::new("ls", format!("ls -la {field} | head -20")))
}

// ───────────────────────────────────────── fzf_select ────────

pub struct FzfSelect;

#[async_trait]
impl CommandHandler for FzfSelect {
    fn name(&self) -> &'static str {
        "fzf_select"
    }

    fn usage(&self) -> &'static str {
        ":fzf_select  Find a file below the current directory and select it"
    }

    async fn execute(&self, ctx: &Context<'_>, _args: &CommandArgs) -> Result<()> {
        let request = SelectionRequest::new(
            CandidateSource::Command(entries_of_type("f")),
            ctx.config.timeouts.select,
        )
        .preview(file_preview())
        .options(
            SelectorOptions::default()
                .header("Select file to navigate to")
                .preview_window("right:50%:wrap"),
        );

        if let Some(path) = ctx.picker.pick_path(&request, PathKind::File).await? {
            ctx.host
                .select_file(&path)
                .map_err(|e| CommandError::host("select file", e))?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────── fzf_search ────────

/// Live content search: the selector reruns ripgrep on every keystroke.
pub struct FzfSearch;

#[async_trait]
impl CommandHandler for FzfSearch {
    fn name(&self) -> &'static str {
        "fzf_search"
    }

    fn usage(&self) -> &'static str {
        ":fzf_search [query]  Search file contents with ripgrep and select the match"
    }

    async fn execute(&self, ctx: &Context<'_>, args: &CommandArgs) -> Result<()> {
        // The reload binding runs rg on its own; there is no fallback for it.
        if !ctx.picker.has_tool("rg") {
            return Err(CommandError::ToolNotFound("rg".into()));
        }

        let request = SelectionRequest::new(CandidateSource::None, ctx.config.timeouts.select)
            .preview(ToolChoice::new(
                Preview::new("bat", "bat --color=always --highlight-line {2} {1}"),
                Preview::new("head", "head -200 {1}"),
            ))
            .options(
                SelectorOptions::default()
                    .ansi()
                    .disabled()
                    .query(args.rest(1).map(str::to_string))
                    .delimiter(":")
                    .preview_window("right:50%:+{2}/2")
                    .bind(format!("start:reload:{RG_RELOAD}"))
                    .bind(format!("change:reload:{RG_RELOAD}")),
            )
            .extract(Extract::Field {
                delimiter: ':',
                index: 1,
            });

        if let Some(path) = ctx.picker.pick_path(&request, PathKind::File).await? {
            ctx.host
                .select_file(&path)
                .map_err(|e| CommandError::host("select file", e))?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────── fzf_directories ───

pub struct FzfDirectories;

#[async_trait]
impl CommandHandler for FzfDirectories {
    fn name(&self) -> &'static str {
        "fzf_directories"
    }

    fn usage(&self) -> &'static str {
        ":fzf_directories  Find a directory below the current one and enter it"
    }

    async fn execute(&self, ctx: &Context<'_>, _args: &CommandArgs) -> Result<()> {
        let request = SelectionRequest::new(
            CandidateSource::Command(entries_of_type("d")),
            ctx.config.timeouts.navigate,
        )
        .preview(dir_preview("{}"))
        .options(
            SelectorOptions::default()
                .header("Select directory to navigate to")
                .preview_window("right:50%:wrap"),
        );

        if let Some(dir) = ctx.picker.pick_path(&request, PathKind::Directory).await? {
            ctx.host
                .change_directory(&dir)
                .map_err(|e| CommandError::host("change directory", e))?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────── fzf_bookmarks ─────

pub struct FzfBookmarks;

#[async_trait]
impl CommandHandler for FzfBookmarks {
    fn name(&self) -> &'static str {
        "fzf_bookmarks"
    }

    fn usage(&self) -> &'static str {
        ":fzf_bookmarks  Jump to a configured bookmark"
    }

    async fn execute(&self, ctx: &Context<'_>, _args: &CommandArgs) -> Result<()> {
        // `Name<TAB>path`; only the name is shown.
        let choices: Vec<String> = ctx
            .config
            .bookmarks()
            .into_iter()
            .filter(|b| b.path.exists())
            .map(|b| format!("{}\t{}", b.name, b.path.display()))
            .collect();
        if choices.is_empty() {
            return Err(CommandError::not_applicable("No valid bookmarks found"));
        }

        let request = SelectionRequest::new(
            CandidateSource::Lines(choices),
            ctx.config.timeouts.navigate,
        )
        .preview(dir_preview("{2}"))
        .options(SelectorOptions::default().delimiter("\t").with_nth("1"))
        .extract(Extract::Tail {
            delimiter: '\t',
            index: 2,
        });

        if let Some(dir) = ctx.picker.pick_path(&request, PathKind::Directory).await? {
            ctx.host
                .change_directory(&dir)
                .map_err(|e| CommandError::host("change directory", e))?;
        }
        Ok(())
    }
}
