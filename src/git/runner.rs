use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::error::CommandError;
use crate::process::{CommandOutput, run_with_timeout};

pub trait GitRunner: Send + Sync {
    /// Run the `git` command within the given `repo` with `args`, giving up after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the `git` process cannot be spawned, fails while being
    /// waited on, or runs past `timeout`.
    fn run_git(
        &self,
        repo: &Path,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;
}

pub struct DefaultGitRunner;

impl GitRunner for DefaultGitRunner {
    fn run_git(
        &self,
        repo: &Path,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let mut command = Command::new("git");
        command
            .arg("-C")
            .arg(repo)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_OPTIONAL_LOCKS", "0");
        run_with_timeout(command, timeout)
    }
}
