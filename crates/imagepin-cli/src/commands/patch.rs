use imagepin_core::{ImagepinConfig, ParameterSet};
use imagepin_patch::{ReplacementResult, TemplatePatcher};
use std::path::{Path, PathBuf};

pub struct PatchArgs {
    pub template: Option<PathBuf>,
    pub set: Vec<String>,
    pub strict: bool,
    pub dry_run: bool,
    pub comment_marker: Option<String>,
}

/// Rewrite the requested parameters in the template file.
pub async fn patch(args: PatchArgs) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let config = ImagepinConfig::load(&project_dir)?;
    let params = ParameterSet::parse_pairs(&args.set)?;

    let template = args
        .template
        .unwrap_or_else(|| project_dir.join(&config.template.path));
    let marker = args
        .comment_marker
        .unwrap_or(config.template.comment_marker);
    let patcher = TemplatePatcher::with_comment_marker(marker);

    let outcome = if args.dry_run {
        patcher.preview(&template, &params)
    } else {
        patcher.patch(&template, &params)
    };
    let result = super::accept_coverage(outcome, args.strict)?;

    print_summary(&template, &result, args.dry_run);
    Ok(())
}

pub(crate) fn print_summary(template: &Path, result: &ReplacementResult, dry_run: bool) {
    for edit in &result.edits {
        if dry_run {
            println!("{}:{}", template.display(), edit.line);
            println!("  - {}", edit.before.trim_end());
            println!("  + {}", edit.after.trim_end());
        } else {
            println!("  line {}: {}", edit.line, edit.after.trim());
        }
    }

    let verb = if dry_run { "Would make" } else { "Made" };
    if result.replacements == 0 {
        println!(
            "{} already up to date ({} matching line(s))",
            template.display(),
            result.matched_lines
        );
    } else {
        println!(
            "{verb} {} replacement(s) in {}",
            result.replacements,
            template.display()
        );
    }
}
