use crate::error::ExecError;
use crate::executor::{CommandExecutor, CommandSpec, RealExecutor};
use serde::Deserialize;
use std::collections::HashMap;

/// Read-only access to image metadata in a container registry.
#[allow(async_fn_in_trait)]
pub trait RegistryClient {
    /// Label `key` of `image`, or `None` when the image or the label does not exist.
    async fn get_label(&self, image: &str, key: &str) -> Result<Option<String>, RegistryError>;
}

/// Registry access through `crane config`, which prints the image config JSON.
///
/// Credentials come from the usual docker keychain; nothing is configured here.
pub struct CraneRegistry<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl CraneRegistry<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for CraneRegistry<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> CraneRegistry<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }
}

impl<E: CommandExecutor> RegistryClient for CraneRegistry<E> {
    async fn get_label(&self, image: &str, key: &str) -> Result<Option<String>, RegistryError> {
        let cmd = CommandSpec::new("crane").args(["config", image]);

        let config = match self.executor.exec(&cmd).await {
            Ok(out) => out,
            Err(e) if e.stderr().is_some_and(is_not_found) => {
                tracing::info!(image, error = %e, "image doesn't exist");
                return Ok(None);
            }
            Err(e) => {
                return Err(RegistryError::Fetch {
                    image: image.to_owned(),
                    source: e,
                });
            }
        };

        label_from_config(&config, key).map_err(|e| RegistryError::Parse {
            image: image.to_owned(),
            source: e,
        })
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    config: Option<ContainerConfig>,
    #[serde(default)]
    container_config: Option<ContainerConfig>,
}

#[derive(Deserialize)]
struct ContainerConfig {
    #[serde(rename = "Labels", default)]
    labels: Option<HashMap<String, String>>,
}

/// Look up a label in an image config file.
///
/// Checks `config.Labels` first, then the legacy `container_config.Labels`.
pub fn label_from_config(json: &str, key: &str) -> Result<Option<String>, serde_json::Error> {
    let file: ConfigFile = serde_json::from_str(json)?;
    let label = [file.config, file.container_config]
        .into_iter()
        .flatten()
        .filter_map(|c| c.labels)
        .find_map(|mut labels| labels.remove(key));
    Ok(label)
}

/// Registry responses meaning "no such image" rather than a real failure.
fn is_not_found(stderr: &str) -> bool {
    const MARKERS: &[&str] = &["MANIFEST_UNKNOWN", "NAME_UNKNOWN", "404 Not Found"];
    MARKERS.iter().any(|m| stderr.contains(m))
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to fetch config of {image}")]
    Fetch { image: String, source: ExecError },

    #[error("invalid image config for {image}")]
    Parse {
        image: String,
        source: serde_json::Error,
    },
}
