use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::warn;

use crate::errors::ServeError;
use crate::types::Link;

/// Enumerate a content directory into navigation links.
///
/// Hidden entries and the reserved `_index.md` summary are skipped, display
/// names lose their `.md` suffix, and one display name yields exactly one
/// link even when both `name.md` and `name/` exist (first occurrence wins).
/// Directory links carry a trailing `/`. Entries are ordered
/// lexicographically by raw name so listings are stable across platforms.
pub fn list_dir(dir: &Path, url_base: &str) -> Result<Vec<Link>, ServeError> {
    if dir.as_os_str().is_empty() {
        return Err(ServeError::Containment);
    }

    let read = fs::read_dir(dir).map_err(|err| {
        warn!("Couldn't load path {dir:?}: {err}");
        ServeError::Io(err)
    })?;
    let mut entries = Vec::new();
    for entry in read {
        let entry = entry?;
        let is_dir = entry.file_type()?.is_dir();
        entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let base = if url_base.ends_with('/') {
        url_base.to_string()
    } else {
        format!("{url_base}/")
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for (name, is_dir) in entries {
        // Hidden names allow disabling files; _index.md is the summary slot
        if name.starts_with('.') || name == "_index.md" {
            continue;
        }
        let display = name.strip_suffix(".md").unwrap_or(&name).to_string();
        if !seen.insert(display.clone()) {
            continue;
        }
        let path = if is_dir {
            format!("{base}{display}/")
        } else {
            format!("{base}{display}")
        };
        links.push(Link {
            title: display,
            path,
        });
    }
    Ok(links)
}
