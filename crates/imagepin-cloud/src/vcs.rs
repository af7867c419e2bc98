use crate::error::ExecError;
use crate::executor::{CommandExecutor, CommandSpec, RealExecutor};
use std::path::PathBuf;

/// Identifies the source revision being built.
#[allow(async_fn_in_trait)]
pub trait VersionControl {
    /// Full commit hash of `HEAD`.
    async fn current_revision(&self) -> Result<String, VcsError>;
}

/// `git` CLI rooted at a repository directory.
pub struct GitCli<E: CommandExecutor = RealExecutor> {
    executor: E,
    repo_dir: PathBuf,
}

impl GitCli<RealExecutor> {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self::with_executor(RealExecutor, repo_dir)
    }
}

impl<E: CommandExecutor> GitCli<E> {
    pub fn with_executor(executor: E, repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            repo_dir: repo_dir.into(),
        }
    }
}

impl<E: CommandExecutor> VersionControl for GitCli<E> {
    async fn current_revision(&self) -> Result<String, VcsError> {
        let cmd = CommandSpec::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(&self.repo_dir);

        let out = self
            .executor
            .exec(&cmd)
            .await
            .map_err(|e| VcsError::RevParse { source: e })?;

        let revision = out.trim();
        if revision.is_empty() {
            return Err(VcsError::EmptyRevision);
        }
        Ok(revision.to_owned())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("git rev-parse HEAD failed — is this a git repository with at least one commit?")]
    RevParse { source: ExecError },

    #[error("git rev-parse HEAD printed nothing")]
    EmptyRevision,
}
