use imagepin_core::ParameterSet;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::atomic::write_atomic;

/// Default prefix of annotation lines in jsonnet prototypes.
pub const DEFAULT_COMMENT_MARKER: &str = "//";

/// Rewrites parameter values in a line-oriented template file.
///
/// Two line shapes are recognised:
///
/// ```text
/// // @optionalParam image string gcr.io/app:old Image to run   <- annotation
///       image: "gcr.io/app:old",                              <- assignment
/// ```
///
/// Only the value token changes; indentation, quoting, trailing commas and
/// anything after the value are kept.
#[derive(Debug, Clone)]
pub struct TemplatePatcher {
    comment_marker: String,
}

impl Default for TemplatePatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplatePatcher {
    pub fn new() -> Self {
        Self {
            comment_marker: DEFAULT_COMMENT_MARKER.to_owned(),
        }
    }

    pub fn with_comment_marker(marker: impl Into<String>) -> Self {
        Self {
            comment_marker: marker.into(),
        }
    }

    pub fn comment_marker(&self) -> &str {
        &self.comment_marker
    }

    /// Patch `path` in place.
    ///
    /// Fails with [`PatchError::NoReplacements`] before touching the file if
    /// no line references any parameter. When some parameters matched nothing
    /// the file is still written and [`PatchError::PartialCoverage`] is
    /// returned so the caller decides whether that aborts.
    pub fn patch(
        &self,
        path: &Path,
        params: &ParameterSet,
    ) -> Result<ReplacementResult, PatchError> {
        self.run(path, params, true)
    }

    /// Same checks as [`patch`](Self::patch), without writing.
    pub fn preview(
        &self,
        path: &Path,
        params: &ParameterSet,
    ) -> Result<ReplacementResult, PatchError> {
        self.run(path, params, false)
    }

    fn run(
        &self,
        path: &Path,
        params: &ParameterSet,
        write: bool,
    ) -> Result<ReplacementResult, PatchError> {
        let original = std::fs::read_to_string(path).map_err(|e| PatchError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let Rendered { content, result } = self.render(&original, params)?;

        if result.matched_lines == 0 {
            return Err(PatchError::NoReplacements {
                path: path.to_path_buf(),
                params: params.names().map(str::to_owned).collect(),
            });
        }

        if write && result.replacements > 0 {
            write_atomic(path, &content).map_err(|e| PatchError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        tracing::info!(
            path = %path.display(),
            replacements = result.replacements,
            matched = result.matched_lines,
            dry_run = !write,
            "Successfully made {} replacements",
            result.replacements
        );

        if result.is_complete() {
            Ok(result)
        } else {
            tracing::warn!(
                unmatched = %result.unmatched().join(", "),
                "made fewer replacements than parameters"
            );
            Err(PatchError::PartialCoverage(result))
        }
    }

    /// Rewrite template text in memory.
    ///
    /// Lines are split on `\n` and joined back with `\n`, so a missing or
    /// present trailing newline and any `\r` survive untouched.
    pub fn render(&self, content: &str, params: &ParameterSet) -> Result<Rendered, PatchError> {
        if self.comment_marker.is_empty() {
            return Err(PatchError::EmptyCommentMarker);
        }

        let rules = params
            .iter()
            .map(|(name, value)| ParamRule::compile(&self.comment_marker, name, value))
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = ReplacementResult {
            per_param: params.names().map(|n| (n.to_owned(), 0)).collect(),
            ..ReplacementResult::default()
        };

        let mut lines: Vec<String> = Vec::new();
        for (idx, line) in content.split('\n').enumerate() {
            let mut current = line.to_owned();
            let mut hit: Vec<String> = Vec::new();

            for rule in &rules {
                if !current.contains(rule.name) {
                    continue;
                }
                let rewritten = if current.starts_with(&self.comment_marker) {
                    rule.apply_annotation(&current)
                } else {
                    rule.apply_assignment(&current)
                };
                if let Some(rewritten) = rewritten {
                    *result.per_param.entry(rule.name.to_owned()).or_default() += 1;
                    hit.push(rule.name.to_owned());
                    current = rewritten;
                }
            }

            if !hit.is_empty() {
                result.matched_lines += 1;
                if current != line {
                    result.replacements += 1;
                    result.edits.push(LineEdit {
                        line: idx + 1,
                        params: hit,
                        before: line.to_owned(),
                        after: current.clone(),
                    });
                }
            }
            lines.push(current);
        }

        Ok(Rendered {
            content: lines.join("\n"),
            result,
        })
    }
}

/// Compiled patterns for one parameter.
struct ParamRule<'a> {
    name: &'a str,
    value: &'a str,
    assignment: Regex,
    annotation: Regex,
}

impl<'a> ParamRule<'a> {
    fn compile(marker: &str, name: &'a str, value: &'a str) -> Result<Self, PatchError> {
        if !is_writable_value(value) {
            return Err(PatchError::InvalidValue {
                param: name.to_owned(),
                value: value.to_owned(),
            });
        }

        let escaped = regex::escape(name);
        let pattern_err = |e: regex::Error| PatchError::Pattern {
            param: name.to_owned(),
            source: e,
        };

        // indent, key, one or more colons, spacing | "quoted" (may be empty) or bare value
        let assignment = Regex::new(&format!(
            r#"^([ \t]*{escaped}:+[ \t]*)(?:"([^"\r\n]*)"|[^",\s:][^",\s]*)"#
        ))
        .map_err(pattern_err)?;
        // marker @directive key type | old value
        let annotation = Regex::new(&format!(
            r"^({marker} @\w+ {escaped} \w+ )\S+",
            marker = regex::escape(marker)
        ))
        .map_err(pattern_err)?;

        Ok(Self {
            name,
            value,
            assignment,
            annotation,
        })
    }

    fn apply_assignment(&self, line: &str) -> Option<String> {
        let caps = self.assignment.captures(line)?;
        let whole = caps.get(0)?;
        let quote = if caps.get(2).is_some() { "\"" } else { "" };
        Some(format!(
            "{before}{open}{quote}{value}{quote}{after}",
            before = &line[..whole.start()],
            open = &caps[1],
            value = self.value,
            after = &line[whole.end()..],
        ))
    }

    fn apply_annotation(&self, line: &str) -> Option<String> {
        let caps = self.annotation.captures(line)?;
        let whole = caps.get(0)?;
        Some(format!(
            "{before}{prefix}{value}{after}",
            before = &line[..whole.start()],
            prefix = &caps[1],
            value = self.value,
            after = &line[whole.end()..],
        ))
    }
}

/// A value can be written only if both patterns read it back whole on the
/// next run: non-empty, no leading colon, no quote, comma or whitespace.
fn is_writable_value(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with(':')
        && !value.chars().any(|c| c == '"' || c == ',' || c.is_whitespace())
}

/// Rewritten template text plus what changed.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub content: String,
    pub result: ReplacementResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementResult {
    /// Lines whose text changed.
    pub replacements: usize,
    /// Lines matching any parameter, changed or not.
    pub matched_lines: usize,
    /// Matching lines per parameter; zero means the parameter was not found.
    pub per_param: BTreeMap<String, usize>,
    pub edits: Vec<LineEdit>,
}

impl ReplacementResult {
    /// Parameters that matched no line.
    pub fn unmatched(&self) -> Vec<&str> {
        self.per_param
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn matched_params(&self) -> Vec<&str> {
        self.per_param
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Every parameter matched at least one line.
    pub fn is_complete(&self) -> bool {
        self.per_param.values().all(|count| *count > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    /// 1-based line number.
    pub line: usize,
    pub params: Vec<String>,
    pub before: String,
    pub after: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("failed to read template {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write template {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "no replacements made in {path} for [{}] — are you sure you specified the correct param?",
        .params.join(", ")
    )]
    NoReplacements { path: PathBuf, params: Vec<String> },

    #[error(
        "made fewer replacements than parameters; not found: {} — typo?",
        .0.unmatched().join(", ")
    )]
    PartialCoverage(ReplacementResult),

    #[error(
        "value {value:?} for parameter '{param}' cannot be pinned: it must be non-empty, \
         not start with ':' and contain no quotes, commas or whitespace"
    )]
    InvalidValue { param: String, value: String },

    #[error("comment marker must not be empty")]
    EmptyCommentMarker,

    #[error("invalid pattern for parameter '{param}'")]
    Pattern { param: String, source: regex::Error },
}

impl PatchError {
    /// Partial coverage is reported after the file was written; everything
    /// else means the template was not changed.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::PartialCoverage(_))
    }

    /// Result carried by a non-fatal error.
    pub fn partial_result(&self) -> Option<&ReplacementResult> {
        match self {
            Self::PartialCoverage(result) => Some(result),
            _ => None,
        }
    }
}
