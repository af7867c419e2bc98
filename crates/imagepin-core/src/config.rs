use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "imagepin.toml";

/// imagepin.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagepinConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub template: TemplateConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// GCP project that owns the image registry path
    pub gcp_project_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image name inside the registry project
    #[serde(default = "default_image_name")]
    pub name: String,
    /// Registry host
    #[serde(default = "default_registry")]
    pub registry: String,
    /// Directory holding the Makefile that builds the image, relative to the repo root
    #[serde(default = "default_component_dir")]
    pub component_dir: PathBuf,
    /// Make target that builds and pushes the image
    #[serde(default = "default_build_target")]
    pub build_target: String,
    /// Image label carrying the git version the image was built from
    #[serde(default = "default_version_label")]
    pub version_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Template file to patch, relative to the repo root
    #[serde(default = "default_template_path")]
    pub path: PathBuf,
    /// Parameter receiving the freshly built image reference
    #[serde(default = "default_param")]
    pub param: String,
    /// Prefix marking annotation lines
    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            name: default_image_name(),
            registry: default_registry(),
            component_dir: default_component_dir(),
            build_target: default_build_target(),
            version_label: default_version_label(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: default_template_path(),
            param: default_param(),
            comment_marker: default_comment_marker(),
        }
    }
}

impl ImagepinConfig {
    /// Load from imagepin.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                path: config_path.clone(),
                source: e,
            })?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
            path: config_path.clone(),
            source: e,
        })?;

        if config.template.comment_marker.is_empty() {
            return Err(crate::Error::EmptyCommentMarker { path: config_path });
        }
        Ok(config)
    }

    /// Resolve the GCP project, preferring an explicit override.
    pub fn gcp_project_id<'a>(&'a self, cli_override: Option<&'a str>) -> crate::Result<&'a str> {
        cli_override
            .or(self.project.gcp_project_id.as_deref())
            .filter(|p| !p.is_empty())
            .ok_or(crate::Error::MissingProjectId)
    }

    /// Floating tag of the most recently pushed image, e.g. `gcr.io/proj/app:latest`.
    pub fn latest_image(&self, gcp_project_id: &str) -> String {
        format!(
            "{registry}/{project}/{name}:latest",
            registry = self.image.registry,
            project = gcp_project_id,
            name = self.image.name,
        )
    }
}

fn default_image_name() -> String {
    "jupyter-web-app".to_owned()
}

fn default_registry() -> String {
    "gcr.io".to_owned()
}

fn default_component_dir() -> PathBuf {
    PathBuf::from("components/jupyter-web-app")
}

fn default_build_target() -> String {
    "build-gcb".to_owned()
}

fn default_version_label() -> String {
    "git-version".to_owned()
}

fn default_template_path() -> PathBuf {
    PathBuf::from("kubeflow/jupyter/prototypes/jupyter-web-app.jsonnet")
}

fn default_param() -> String {
    "image".to_owned()
}

fn default_comment_marker() -> String {
    "//".to_owned()
}
