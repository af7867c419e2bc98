mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "imagepin",
    about = "Rebuild a container image and pin it in a deployment template"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite parameter values in a template file
    Patch {
        /// Template file (defaults to [template].path in imagepin.toml)
        #[arg(long, short = 't')]
        template: Option<PathBuf>,
        /// Parameter to set, as KEY=VALUE (repeatable)
        #[arg(long = "set", short = 's', value_name = "KEY=VALUE", required = true)]
        set: Vec<String>,
        /// Fail when some parameter matched no line
        #[arg(long)]
        strict: bool,
        /// Show the edits without writing the file
        #[arg(long)]
        dry_run: bool,
        /// Prefix of annotation lines (defaults to [template].comment_marker)
        #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
        comment_marker: Option<String>,
    },
    /// Build the image and print its reference
    Build {
        /// GCP project to push to (overrides [project].gcp_project_id)
        #[arg(long, short = 'p')]
        project: Option<String>,
    },
    /// Rebuild the image if the source changed and pin it in the template
    Update {
        /// GCP project to push to (overrides [project].gcp_project_id)
        #[arg(long, short = 'p')]
        project: Option<String>,
        /// Fail when the template parameter matched no line
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Patch {
            template,
            set,
            strict,
            dry_run,
            comment_marker,
        } => {
            commands::patch(commands::PatchArgs {
                template,
                set,
                strict,
                dry_run,
                comment_marker,
            })
            .await?
        }
        Commands::Build { project } => commands::build(project.as_deref()).await?,
        Commands::Update { project, strict } => {
            commands::update(project.as_deref(), strict).await?
        }
    }

    Ok(())
}
