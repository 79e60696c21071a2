//! The file-manager commands.  Each one is a [`CommandHandler`] that builds a
//! picker request, validates what comes back and asks the host to act.

mod bulk_rename;
mod edit;
mod extract;
mod git;
mod navigate;

use crate::app::registry::{CommandHandler, Registry};

pub use bulk_rename::BulkRename;
pub use edit::Edit;
pub use extract::ExtractArchive;
pub use git::{GitBranch, GitLog, GitStatus};
pub use navigate::{FzfBookmarks, FzfDirectories, FzfSearch, FzfSelect};

/// A registry holding every built-in command.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(FzfSelect)
        .register(FzfSearch)
        .register(FzfDirectories)
        .register(FzfBookmarks)
        .register(GitLog)
        .register(GitStatus)
        .register(GitBranch)
        .register(ExtractArchive)
        .register(BulkRename)
        .register(Edit);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_registered() {
        let registry = registry();
        let names: Vec<&str> = registry.usages().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec![
                "bulk_rename",
                "edit",
                "extract",
                "fzf_bookmarks",
                "fzf_directories",
                "fzf_search",
                "fzf_select",
                "git_branch",
                "git_log",
                "git_status",
            ]
        );
        for (name, usage) in registry.usages() {
            assert!(usage.starts_with(&format!(":{name}")), "{usage}");
        }
        assert!(registry.get("fzf_select").is_some_and(|h| h.name() == "fzf_select"));
    }
}
