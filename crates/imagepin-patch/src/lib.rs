//! Template parameter patching for imagepin.
//!
//! # Patch flow
//!
//! ```text
//! imagepin patch --set image=gcr.io/p/app:v2
//!   1. Read     ── whole template into memory, split on '\n'
//!   2. Rewrite  ── per line, per parameter: annotation or assignment pattern
//!   3. Check    ── zero matched lines → NoReplacements, nothing written
//!   4. Swap     ── sibling temp file, fsync, rename over the template
//!   5. Report   ── unmatched parameters → PartialCoverage (file already written)
//! ```
//!
//! Re-running with the same values matches the same lines but changes none,
//! so the file is left alone and the run still succeeds.

pub mod atomic;
pub mod patcher;

pub use patcher::{LineEdit, PatchError, Rendered, ReplacementResult, TemplatePatcher};
