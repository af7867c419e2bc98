mod build;
mod patch;
mod update;

use imagepin_patch::{PatchError, ReplacementResult};

pub use build::build;
pub use patch::{PatchArgs, patch};
pub use update::update;

/// Treat partial coverage as a warning unless `strict`; every other error propagates.
pub(crate) fn accept_coverage(
    outcome: Result<ReplacementResult, PatchError>,
    strict: bool,
) -> anyhow::Result<ReplacementResult> {
    match outcome {
        Ok(result) => Ok(result),
        Err(PatchError::PartialCoverage(result)) if !strict => {
            println!(
                "Warning: no line matched {} — typo? (use --strict to fail)",
                result.unmatched().join(", ")
            );
            Ok(result)
        }
        Err(e) => Err(e.into()),
    }
}
