//! Git pickers: log, status, branch.
//!
//! All three only run when the working directory holds a `.git` entry;
//! otherwise they fail before spawning anything.

use async_trait::async_trait;
use tracing::info;

use crate::app::context::Context;
use crate::app::registry::{CommandArgs, CommandHandler};
use crate::core::fs::{is_repository, PathKind};
use crate::core::picker::{CandidateSource, SelectionRequest};
use crate::core::selector::{Extract, Preview, SelectorOptions};
use crate::core::tool::{Invocation, ToolChoice};
use crate::error::{CommandError, Result};

fn require_repository(ctx: &Context<'_>) -> Result<()> {
    if is_repository(ctx.cwd()) {
        Ok(())
    } else {
        Err(CommandError::not_applicable("Not in a git repository"))
    }
}

fn git(args: &[&str]) -> CandidateSource {
    CandidateSource::Command(ToolChoice::only(Invocation::new("git").args(args)))
}

fn git_preview(template: &str) -> ToolChoice<Preview> {
    ToolChoice::only(Preview::new("git", template))
}

/// Abbreviated or full object name.
fn is_commit_hash(value: &str) -> bool {
    (4..=64).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Names safe to hand to `git checkout` as a single argument.
fn is_branch_name(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.contains("..")
        && !value.ends_with(".lock")
        && !value.ends_with('/')
        && value != "HEAD"
        && !value.ends_with("/HEAD")
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
}

// ───────────────────────────────────────── git_log ───────────

pub struct GitLog;

#[async_trait]
impl CommandHandler for GitLog {
    fn name(&self) -> &'static str {
        "git_log"
    }

    fn usage(&self) -> &'static str {
        ":git_log  Browse commits and show the chosen one"
    }

    async fn execute(&self, ctx: &Context<'_>, _args: &CommandArgs) -> Result<()> {
        require_repository(ctx)?;

        let request = SelectionRequest::new(
            git(&["log", "--oneline", "--color=always"]),
            ctx.config.timeouts.select,
        )
        .preview(git_preview("git show --color=always {1}"))
        .options(
            SelectorOptions::default()
                .ansi()
                .header("Select commit")
                .preview_window("right:60%"),
        )
        .extract(Extract::Field {
            delimiter: ' ',
            index: 1,
        });

        if let Some(hash) = ctx.picker.pick_identifier(&request, is_commit_hash).await? {
            ctx.host
                .run_host_command(&format!("git show {hash}"), "p")
                .map_err(|e| CommandError::host("show commit", e))?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────── git_status ────────

pub struct GitStatus;

#[async_trait]
impl CommandHandler for GitStatus {
    fn name(&self) -> &'static str {
        "git_status"
    }

    fn usage(&self) -> &'static str {
        ":git_status  Pick a changed file and select it"
    }

    async fn execute(&self, ctx: &Context<'_>, _args: &CommandArgs) -> Result<()> {
        require_repository(ctx)?;

        // quotePath=false keeps non-ASCII names readable; the porcelain
        // parser still handles the quoting git applies to odd names.
        let request = SelectionRequest::new(
            git(&["-c", "core.quotePath=false", "status", "--porcelain"]),
            ctx.config.timeouts.navigate,
        )
        // fzf drops the leading status blank, so the path starts at field 2.
        // Renames and quoted names only preview on a best-effort basis.
        .preview(git_preview("git diff --color=always -- {2..}"))
        .options(
            SelectorOptions::default()
                .header("Select changed file")
                .preview_window("right:60%"),
        )
        .extract(Extract::GitPorcelain);

        if let Some(path) = ctx.picker.pick_path(&request, PathKind::Existing).await? {
            ctx.host
                .select_file(&path)
                .map_err(|e| CommandError::host("select file", e))?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────── git_branch ────────

pub struct GitBranch;

#[async_trait]
impl CommandHandler for GitBranch {
    fn name(&self) -> &'static str {
        "git_branch"
    }

    fn usage(&self) -> &'static str {
        ":git_branch  Check out a local or remote branch"
    }

    async fn execute(&self, ctx: &Context<'_>, _args: &CommandArgs) -> Result<()> {
        require_repository(ctx)?;

        let request = SelectionRequest::new(
            git(&["branch", "-a", "--format=%(refname:short)"]),
            ctx.config.timeouts.navigate,
        )
        .preview(git_preview("git log --oneline --color=always -n 10 {1}"))
        .options(SelectorOptions::default().ansi().header("Select branch"));

        let Some(branch) = ctx.picker.pick_identifier(&request, is_branch_name).await? else {
            return Ok(());
        };

        let checkout = Invocation::new("git").args(["checkout", branch.as_str()]);
        let output = ctx
            .runner
            .output(&checkout, ctx.cwd(), ctx.config.timeouts.git)
            .await
            .map_err(CommandError::from_run)?;
        if !output.success() {
            return Err(CommandError::ProcessFailure {
                program: "git checkout".into(),
                diagnostic: output.diagnostic(),
            });
        }

        info!(%branch, "checked out");
        ctx.host.notify(&format!("Switched to branch: {branch}"), false);
        ctx.host
            .reload_current_view()
            .map_err(|e| CommandError::host("reload", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::process::Feed;
    use crate::testing::{failed_output, ok_output, Call, Effect, FakeResolver, FakeRunner, RecordingHost};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    const TOOLS: &[&str] = &["fzf", "git"];

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    fn context<'a>(
        host: &'a RecordingHost,
        config: &'a AppConfig,
        runner: &Arc<FakeRunner>,
        cwd: &Path,
    ) -> Context<'a> {
        Context::new(
            host,
            config,
            runner.clone(),
            Arc::new(FakeResolver::with(TOOLS)),
            cwd.to_path_buf(),
        )
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_commit_hash("a1b2c3d"));
        assert!(!is_commit_hash("abc"));
        assert!(!is_commit_hash("a1b2c3g"));

        assert!(is_branch_name("main"));
        assert!(is_branch_name("origin/feature-x"));
        assert!(!is_branch_name(""));
        assert!(!is_branch_name("-f"));
        assert!(!is_branch_name("a..b"));
        assert!(!is_branch_name("has space"));
        assert!(!is_branch_name("origin/HEAD -> origin/main"));
        assert!(!is_branch_name("origin/HEAD"));
    }

    #[tokio::test]
    async fn test_outside_repository_spawns_nothing() {
        let dir = TempDir::new().unwrap();
        let host = RecordingHost::new();
        let config = AppConfig::default();
        let runner = Arc::new(FakeRunner::new());
        let ctx = context(&host, &config, &runner, dir.path());

        for handler in [&GitLog as &dyn CommandHandler, &GitStatus, &GitBranch] {
            let err = handler
                .execute(&ctx, &CommandArgs::parse(handler.name()))
                .await
                .unwrap_err();
            assert!(matches!(err, CommandError::NotApplicable(_)));
        }
        assert!(runner.calls().is_empty());
        assert!(host.effects().is_empty());
    }

    #[tokio::test]
    async fn test_log_shows_commit_in_pager() {
        let dir = repo();
        let host = RecordingHost::new();
        let config = AppConfig::default();
        let runner = Arc::new(FakeRunner::new());
        runner.picks("\u{1b}[33m1a2b3c4\u{1b}[m Fix the thing");
        let ctx = context(&host, &config, &runner, dir.path());

        GitLog.execute(&ctx, &CommandArgs::parse("git_log")).await.unwrap();
        assert_eq!(
            host.effects(),
            vec![Effect::RunHostCommand {
                command_line: "git show 1a2b3c4".into(),
                flags: "p".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_status_selects_renamed_file() {
        let dir = repo();
        fs::write(dir.path().join("new name.rs"), "").unwrap();
        let host = RecordingHost::new();
        let config = AppConfig::default();
        let runner = Arc::new(FakeRunner::new());
        runner.picks("R  old.rs -> \"new name.rs\"");
        let ctx = context(&host, &config, &runner, dir.path());

        GitStatus.execute(&ctx, &CommandArgs::parse("git_status")).await.unwrap();

        match &runner.calls()[0] {
            Call::Pipeline {
                feed: Feed::Command(inv),
                ..
            } => assert_eq!(
                inv.arg_strings(),
                vec!["-c", "core.quotePath=false", "status", "--porcelain"]
            ),
            other => panic!("unexpected {other:?}"),
        }
        match &runner.calls()[0] {
            Call::Pipeline { selector, .. } => assert!(selector
                .arg_strings()
                .contains(&"--preview=git diff --color=always -- {2..}".to_string())),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            host.effects(),
            vec![Effect::SelectFile(dir.path().join("new name.rs"))]
        );
    }

    #[tokio::test]
    async fn test_branch_checkout_and_reload() {
        let dir = repo();
        let host = RecordingHost::new();
        let config = AppConfig::default();
        let runner = Arc::new(FakeRunner::new());
        runner.picks("feature/login");
        runner.push_output(Ok(ok_output("")));
        let ctx = context(&host, &config, &runner, dir.path());

        GitBranch.execute(&ctx, &CommandArgs::parse("git_branch")).await.unwrap();

        assert_eq!(
            runner.calls()[1],
            Call::Output(Invocation::new("git").args(["checkout", "feature/login"]))
        );
        assert_eq!(
            host.effects(),
            vec![
                Effect::Notify {
                    message: "Switched to branch: feature/login".into(),
                    is_error: false
                },
                Effect::Reload,
            ]
        );
    }

    #[tokio::test]
    async fn test_branch_checkout_failure() {
        let dir = repo();
        let host = RecordingHost::new();
        let config = AppConfig::default();
        let runner = Arc::new(FakeRunner::new());
        runner.picks("main");
        runner.push_output(Ok(failed_output(1, "error: local changes would be overwritten")));
        let ctx = context(&host, &config, &runner, dir.path());

        let err = GitBranch
            .execute(&ctx, &CommandArgs::parse("git_branch"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("local changes would be overwritten"));
        assert!(host.effects().is_empty());
    }

    #[tokio::test]
    async fn test_branch_rejects_option_like_name() {
        let dir = repo();
        let host = RecordingHost::new();
        let config = AppConfig::default();
        let runner = Arc::new(FakeRunner::new());
        runner.picks("--orphan");
        let ctx = context(&host, &config, &runner, dir.path());

        let err = GitBranch
            .execute(&ctx, &CommandArgs::parse("git_branch"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidSelection(_)));
        // Only the picker ran; checkout was never attempted.
        assert_eq!(runner.calls().len(), 1);
    }
}
