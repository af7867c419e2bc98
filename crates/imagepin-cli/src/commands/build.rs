use imagepin_cloud::{ImageBuilder, MakeImageBuilder};
use imagepin_core::ImagepinConfig;
use std::path::PathBuf;

/// Build the image and print the reference the build reported.
pub async fn build(project: Option<&str>) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let config = ImagepinConfig::load(&project_dir)?;
    let gcp_project_id = config.gcp_project_id(project)?;

    let builder = MakeImageBuilder::new(
        project_dir.join(&config.image.component_dir),
        &config.image.build_target,
    );

    println!(
        "Building {} with `make {}`...",
        config.image.name, config.image.build_target
    );
    let image = builder.build(gcp_project_id).await?;

    println!("Built: {image}");
    Ok(())
}
