use imagepin_cloud::{
    CraneRegistry, GitCli, ImageBuilder, MakeImageBuilder, RegistryClient, VersionControl,
};
use imagepin_core::image::{revision_from_version_label, short_revision};
use imagepin_core::{ImageRef, ImagepinConfig, ParameterSet};
use imagepin_patch::{ReplacementResult, TemplatePatcher};
use std::path::{Path, PathBuf};

/// Result of a successful update run.
#[derive(Debug)]
pub(crate) enum UpdateOutcome {
    /// The registry image was already built from this commit; nothing was done.
    UpToDate { revision: String },
    /// A new image was built and pinned in the template.
    Updated {
        image: ImageRef,
        template: PathBuf,
        result: ReplacementResult,
    },
}

/// Rebuild the image when the source moved on, then pin it in the template.
pub async fn update(project: Option<&str>, strict: bool) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let config = ImagepinConfig::load(&project_dir)?;
    let gcp_project_id = config.gcp_project_id(project)?;

    let builder = MakeImageBuilder::new(
        project_dir.join(&config.image.component_dir),
        &config.image.build_target,
    );
    let registry = CraneRegistry::new();
    let git = GitCli::new(&project_dir);

    let outcome = run(
        &builder,
        &registry,
        &git,
        &config,
        &project_dir,
        gcp_project_id,
        strict,
    )
    .await?;

    match outcome {
        UpdateOutcome::UpToDate { revision } => {
            println!("Existing image is already built from commit {revision}; nothing to do");
        }
        UpdateOutcome::Updated {
            image,
            template,
            result,
        } => {
            super::patch::print_summary(&template, &result, false);
            println!("Pinned: {image}");
        }
    }

    Ok(())
}

/// Update pipeline: version label → current revision → build → patch.
pub(crate) async fn run<B, R, V>(
    builder: &B,
    registry: &R,
    vcs: &V,
    config: &ImagepinConfig,
    project_dir: &Path,
    gcp_project_id: &str,
    strict: bool,
) -> anyhow::Result<UpdateOutcome>
where
    B: ImageBuilder,
    R: RegistryClient,
    V: VersionControl,
{
    let latest = config.latest_image(gcp_project_id);
    let label = registry
        .get_label(&latest, &config.image.version_label)
        .await?;
    tracing::info!(
        image = %latest,
        label = label.as_deref().unwrap_or("<none>"),
        "most recent image has {}",
        config.image.version_label
    );

    let last_built = label.as_deref().and_then(revision_from_version_label);
    let revision = vcs.current_revision().await?;
    let current = short_revision(&revision);

    if last_built == Some(current) {
        tracing::info!(commit = current, "existing image is already built from this commit");
        return Ok(UpdateOutcome::UpToDate {
            revision: current.to_owned(),
        });
    }

    let image = builder.build(gcp_project_id).await?;

    let mut params = ParameterSet::new();
    params.insert(config.template.param.as_str(), image.as_str());
    let template = project_dir.join(&config.template.path);
    let patcher = TemplatePatcher::with_comment_marker(config.template.comment_marker.as_str());
    let result = super::accept_coverage(patcher.patch(&template, &params), strict)?;

    Ok(UpdateOutcome::Updated {
        image,
        template,
        result,
    })
}
