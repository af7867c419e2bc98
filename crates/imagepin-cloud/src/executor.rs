use crate::error::ExecError;
use std::path::{Path, PathBuf};

/// A program invocation: argv, extra environment, working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Value of an environment override, if set.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `program arg1 arg2`, for error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Abstraction over external CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run a command and capture stdout.
    async fn exec(&self, cmd: &CommandSpec) -> Result<String, ExecError>;

    /// Run a command, streaming output to the terminal.
    async fn exec_streaming(&self, cmd: &CommandSpec) -> Result<(), ExecError>;
}

/// Executor backed by real child processes.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn exec(&self, cmd: &CommandSpec) -> Result<String, ExecError> {
        use std::process::Stdio;

        tracing::debug!(command = %cmd.display(), "exec");
        let output = cmd
            .to_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ExecError::NotFound {
                program: cmd.program.clone(),
                source: e,
            })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ExecError::InvalidUtf8 { source: e })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            Err(ExecError::CommandFailed {
                command: cmd.display(),
                stderr,
            })
        }
    }

    async fn exec_streaming(&self, cmd: &CommandSpec) -> Result<(), ExecError> {
        use std::process::Stdio;

        tracing::debug!(command = %cmd.display(), "exec (streaming)");
        let status = cmd
            .to_command()
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecError::NotFound {
                program: cmd.program.clone(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                command: cmd.display(),
                stderr: format!("exit code: {status}"),
            })
        }
    }
}
