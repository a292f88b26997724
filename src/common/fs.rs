use std::{path::Path, time::UNIX_EPOCH};

use crate::error::{Error, Result};

/// Error unless `path` names an existing regular file.
pub(crate) fn require_file_exists(path: &Path) -> Result<()> {
    let not_found = |what: &str| Error::io(
        format!("{what}: {}", path.display()),
        std::io::Error::from(std::io::ErrorKind::NotFound),
    );
    if !path.exists() { return Err(not_found("File does not exist")) }
    if !path.is_file() { return Err(not_found("Path exists but is not a file")) }
    Ok(())
}

/// Identity of a source file for cache keys: canonical path, byte length and
/// modification time. Cheap to compute even for multi-gigabyte inputs.
pub(crate) fn file_fingerprint(path: &Path) -> Result<String> {
    let canonical = path.canonicalize()
        .map_err(|e| Error::io(format!("resolving {}", path.display()), e))?;
    let meta = std::fs::metadata(&canonical)
        .map_err(|e| Error::io(format!("reading metadata of {}", path.display()), e))?;
    let modified = meta.modified().ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    Ok(format!("{}|{}|{}", canonical.display(), meta.len(), modified))
}

/// Sidecars whose content changes what a shapefile reads as.
const SHAPEFILE_SIDECARS: [&str; 4] = ["shx", "dbf", "prj", "cpg"];

/// Fingerprint of a `.shp` together with its sidecar files. A missing
/// sidecar contributes a fixed marker, so creating or deleting one also
/// changes the result.
pub(crate) fn shapefile_fingerprint(path: &Path) -> Result<String> {
    let mut parts = vec![file_fingerprint(path)?];
    for ext in SHAPEFILE_SIDECARS {
        let sidecar = path.with_extension(ext);
        parts.push(match sidecar.is_file() {
            true => file_fingerprint(&sidecar)?,
            false => format!("{ext}:absent"),
        });
    }
    Ok(parts.join("\u{1f}"))
}
