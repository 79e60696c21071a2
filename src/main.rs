//! Fuzzy pickers for a file manager: files, content search, directories,
//! bookmarks and git, plus archive extraction and bulk rename.
//!
//! Run `fm-pick <command>` through the shell wrapper printed by
//! `--init-bash` / `--init-zsh`; `--list` shows every command.

mod app;
mod commands;
mod config;
mod core;
mod error;
mod shell;
#[cfg(test)]
mod testing;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::context::Context;
use crate::core::process::OsRunner;
use crate::core::tool::PathResolver;
use crate::shell::integration::{self, ShellHost};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Fuzzy pickers for the file manager in your shell")]
struct Cli {
    /// Command to run, followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,

    /// Working directory (defaults to the current one).
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Entry under the cursor.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Marked entries; repeat for each.
    #[arg(long = "selected")]
    selected: Vec<PathBuf>,

    /// Log at debug level when `RUST_LOG` is unset.
    #[arg(short, long)]
    verbose: bool,

    /// List every command with its usage and exit.
    #[arg(long)]
    list: bool,

    /// Print completions for a partially typed command line and exit.
    #[arg(long, value_name = "PARTIAL")]
    complete: Option<String>,

    /// Print the effective configuration and exit.
    #[arg(long = "print-config")]
    print_config: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long = "save-config")]
    save_config: bool,

    /// Print the bash shell function and exit.
    #[arg(long = "init-bash")]
    init_bash: bool,

    /// Print the zsh shell function and exit.
    #[arg(long = "init-zsh")]
    init_zsh: bool,
}

fn init_tracing(verbose: bool) {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr) // never pollute stdout
        .init();
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e:#}", env!("CARGO_PKG_NAME"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // ── shell-integration mode ────────────────────────────────
    if cli.init_bash {
        print!("{}", integration::bash_function());
        return Ok(ExitCode::SUCCESS);
    }
    if cli.init_zsh {
        print!("{}", integration::zsh_function());
        return Ok(ExitCode::SUCCESS);
    }

    let config = config::AppConfig::load();
    if cli.print_config {
        print!("{}", config.serialise());
        return Ok(ExitCode::SUCCESS);
    }
    if cli.save_config {
        let path = config.save()?;
        eprintln!("Saved configuration to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let registry = commands::registry();
    if cli.list {
        for (_, usage) in registry.usages() {
            println!("{usage}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let cwd = match cli.cwd {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("cannot open {}", dir.display()))?,
        None => std::env::current_dir().context("cannot read the current directory")?,
    };
    let host = ShellHost::new(cli.file, cli.selected, config.editor());
    let ctx = Context::new(
        &host,
        &config,
        Arc::new(OsRunner),
        Arc::new(PathResolver),
        cwd,
    );

    if let Some(partial) = cli.complete {
        for line in registry.complete(&ctx, &partial) {
            println!("{line}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    if cli.command.is_empty() {
        anyhow::bail!("no command given (try --list)");
    }
    // The registry already reported the failure through the host.
    match registry.dispatch(&ctx, &cli.command.join(" ")).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}
