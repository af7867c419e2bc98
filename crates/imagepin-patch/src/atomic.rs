use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` without ever exposing a partially written file.
///
/// The new content goes to a temporary file in the same directory, which is
/// then renamed over `path`. If any step fails the temporary file is removed
/// and `path` is left as it was. Permissions of an existing `path` carry over.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    write_atomic_with(path, contents, |tmp, target| {
        tmp.persist(target).map(|_| ()).map_err(|e| e.error)
    })
}

fn write_atomic_with<F>(path: &Path, contents: &str, persist: F) -> std::io::Result<()>
where
    F: FnOnce(NamedTempFile, &Path) -> std::io::Result<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".imagepin-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;

    if path.exists() {
        let perms = std::fs::metadata(path)?.permissions();
        tmp.as_file().set_permissions(perms)?;
    }

    tracing::debug!(tmp = %tmp.path().display(), target = %path.display(), "swapping in rewritten file");
    persist(tmp, path)
}
