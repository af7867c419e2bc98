#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("{program} not found on PATH")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("command output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },
}

impl ExecError {
    /// Captured stderr of a command that ran and exited non-zero.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}
