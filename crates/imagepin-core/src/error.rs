use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("[template].comment_marker in {path} must not be empty")]
    EmptyCommentMarker { path: PathBuf },

    #[error("gcp_project_id not set: pass --project or set [project].gcp_project_id in imagepin.toml")]
    MissingProjectId,

    // ── Parameters ──
    #[error("invalid parameter {input:?}: expected KEY=VALUE")]
    InvalidParam { input: String },

    #[error("parameter '{0}' given more than once")]
    DuplicateParam(String),

    #[error("empty image reference")]
    EmptyImageRef,
}
