use crate::error::ExecError;
use crate::executor::{CommandExecutor, CommandSpec, RealExecutor};
use imagepin_core::ImageRef;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Builds and pushes the container image, returning its full reference.
#[allow(async_fn_in_trait)]
pub trait ImageBuilder {
    async fn build(&self, project: &str) -> Result<ImageRef, BuildError>;
}

/// Runs `make <target>` in the component directory.
///
/// The Makefile receives `PROJECT` (GCP project to push to) and `OUTPUT`
/// (path of a YAML file it must write, containing at least `image: <ref>`).
pub struct MakeImageBuilder<E: CommandExecutor = RealExecutor> {
    executor: E,
    component_dir: PathBuf,
    target: String,
}

impl MakeImageBuilder<RealExecutor> {
    pub fn new(component_dir: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        Self::with_executor(RealExecutor, component_dir, target)
    }
}

impl<E: CommandExecutor> MakeImageBuilder<E> {
    pub fn with_executor(
        executor: E,
        component_dir: impl Into<PathBuf>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            component_dir: component_dir.into(),
            target: target.into(),
        }
    }

    pub fn component_dir(&self) -> &Path {
        &self.component_dir
    }
}

impl<E: CommandExecutor> ImageBuilder for MakeImageBuilder<E> {
    async fn build(&self, project: &str) -> Result<ImageRef, BuildError> {
        let output = tempfile::Builder::new()
            .prefix("imagepin-build-")
            .suffix(".yaml")
            .tempfile()
            .map_err(|e| BuildError::OutputFile { source: e })?;
        let output_path = output
            .path()
            .to_str()
            .ok_or_else(|| BuildError::InvalidPath(output.path().to_path_buf()))?
            .to_owned();

        let cmd = CommandSpec::new("make")
            .arg(&self.target)
            .env("PROJECT", project)
            .env("OUTPUT", &output_path)
            .current_dir(&self.component_dir);

        tracing::info!(
            dir = %self.component_dir.display(),
            target = %self.target,
            project,
            "building image"
        );
        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| BuildError::Make { source: e })?;

        let content =
            std::fs::read_to_string(output.path()).map_err(|e| BuildError::OutputRead {
                path: output.path().to_path_buf(),
                source: e,
            })?;
        let image = parse_build_output(&content)?;
        tracing::info!(image = %image, "image built");
        Ok(image)
    }
}

#[derive(Deserialize)]
struct BuildOutput {
    image: Option<String>,
}

/// Extract the `image` key from the YAML a build writes to `OUTPUT`.
pub fn parse_build_output(content: &str) -> Result<ImageRef, BuildError> {
    let parsed: Option<BuildOutput> =
        serde_yaml::from_str(content).map_err(|e| BuildError::OutputParse { source: e })?;
    let image = parsed
        .and_then(|o| o.image)
        .ok_or(BuildError::MissingImage)?;
    ImageRef::new(image).map_err(|e| BuildError::InvalidImage { source: e })
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to create build output file")]
    OutputFile { source: std::io::Error },

    #[error("build output path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("image build failed")]
    Make { source: ExecError },

    #[error("failed to read build output at {path}")]
    OutputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("build output is not valid YAML")]
    OutputParse { source: serde_yaml::Error },

    #[error("build output has no `image` key")]
    MissingImage,

    #[error("build output has an invalid `image` value")]
    InvalidImage { source: imagepin_core::Error },
}
