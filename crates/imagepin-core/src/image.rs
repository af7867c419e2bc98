use std::fmt;

/// Full container image reference, e.g. `gcr.io/proj/app:v20190101-abc1234`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> crate::Result<Self> {
        let reference = reference.into().trim().to_owned();
        if reference.is_empty() {
            return Err(crate::Error::EmptyImageRef);
        }
        Ok(Self(reference))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Length of the abbreviated commit hash stamped into version labels.
pub const SHORT_REVISION_LEN: usize = 8;

/// Extract the commit hash from a `git describe` style version label.
///
/// `v20190101-v0.4.0-rc.1-12-gabc12345` yields `abc12345`. A label without
/// a `g` is returned whole.
pub fn revision_from_version_label(label: &str) -> Option<&str> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    let revision = label.rsplit_once('g').map_or(label, |(_, rev)| rev);
    (!revision.is_empty()).then_some(revision)
}

/// Abbreviate a full commit hash to [`SHORT_REVISION_LEN`] characters.
pub fn short_revision(revision: &str) -> &str {
    let revision = revision.trim();
    match revision.char_indices().nth(SHORT_REVISION_LEN) {
        Some((idx, _)) => &revision[..idx],
        None => revision,
    }
}
