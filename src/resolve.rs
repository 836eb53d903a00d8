use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::errors::ServeError;

/// Outcome of classifying a request path against a site's content root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A Markdown page; `stem` is the filesystem path without the `.md` suffix
    Page { stem: PathBuf },
    /// A literal file served byte-for-byte
    RawFile { file: PathBuf },
    /// A directory to list; `html_index` overrides the listing when present
    Directory {
        dir: PathBuf,
        html_index: Option<PathBuf>,
    },
    NotFound,
}

/// Reject request paths that could resolve outside the content root.
/// An absolute path or a `..` component fails closed before any read.
pub fn ensure_contained(req_path: &str) -> Result<(), ServeError> {
    if req_path.starts_with('/') {
        return Err(ServeError::Containment);
    }
    for comp in Path::new(req_path).components() {
        if matches!(
            comp,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        ) {
            return Err(ServeError::Containment);
        }
    }
    Ok(())
}

/// Normalize a request path into the page stem the loader will try:
/// a trailing `/` and a `.md` suffix are stripped, the empty path maps
/// to `index`
pub fn page_stem(req_path: &str) -> String {
    let trimmed = req_path.strip_suffix('/').unwrap_or(req_path);
    let trimmed = trimmed.strip_suffix(".md").unwrap_or(trimmed);
    if trimmed.is_empty() {
        "index".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Try resolution candidates in priority order: Markdown page, directory
/// index page, literal file, directory listing. The first hit wins.
pub fn resolve(pub_root: &Path, req_path: &str) -> Result<Resolution, ServeError> {
    ensure_contained(req_path)?;

    let stem = page_stem(req_path);
    if pub_root.join(format!("{stem}.md")).is_file() {
        debug!("Resolved /{req_path} as page {stem}");
        return Ok(Resolution::Page {
            stem: pub_root.join(&stem),
        });
    }

    if pub_root.join(&stem).join("index.md").is_file() {
        debug!("Resolved /{req_path} as index page {stem}/index");
        return Ok(Resolution::Page {
            stem: pub_root.join(&stem).join("index"),
        });
    }

    let literal = pub_root.join(req_path.trim_end_matches('/'));
    if literal.is_file() {
        debug!("Resolved /{req_path} as raw file");
        return Ok(Resolution::RawFile { file: literal });
    }
    if literal.is_dir() {
        let html_index = Some(literal.join("index.html")).filter(|p| p.is_file());
        debug!("Resolved /{req_path} as directory");
        return Ok(Resolution::Directory {
            dir: literal,
            html_index,
        });
    }

    Ok(Resolution::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn content_root() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("about.md"), "# About").unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();
        fs::write(tmp.path().join("docs/a.md"), "# A").unwrap();
        fs::write(tmp.path().join("notes.txt"), "plain").unwrap();
        tmp
    }

    #[test]
    fn page_beats_everything() {
        let root = content_root();
        let resolved = resolve(root.path(), "about").unwrap();
        assert_eq!(
            resolved,
            Resolution::Page {
                stem: root.path().join("about")
            }
        );
    }

    #[test]
    fn md_suffix_is_idempotent() {
        let root = content_root();
        assert_eq!(
            resolve(root.path(), "about.md").unwrap(),
            resolve(root.path(), "about").unwrap()
        );
    }

    #[test]
    fn trailing_slash_is_idempotent() {
        let root = content_root();
        assert_eq!(
            resolve(root.path(), "docs/").unwrap(),
            resolve(root.path(), "docs").unwrap()
        );
        assert_eq!(
            resolve(root.path(), "about/").unwrap(),
            resolve(root.path(), "about").unwrap()
        );
    }

    #[test]
    fn directory_index_page_comes_before_listing() {
        let root = content_root();
        fs::write(root.path().join("docs/index.md"), "# Docs").unwrap();
        let resolved = resolve(root.path(), "docs").unwrap();
        assert_eq!(
            resolved,
            Resolution::Page {
                stem: root.path().join("docs/index")
            }
        );
    }

    #[test]
    fn literal_file_before_directory() {
        let root = content_root();
        let resolved = resolve(root.path(), "notes.txt").unwrap();
        assert_eq!(
            resolved,
            Resolution::RawFile {
                file: root.path().join("notes.txt")
            }
        );
    }

    #[test]
    fn directory_without_index_lists() {
        let root = content_root();
        let resolved = resolve(root.path(), "docs").unwrap();
        assert_eq!(
            resolved,
            Resolution::Directory {
                dir: root.path().join("docs"),
                html_index: None,
            }
        );
    }

    #[test]
    fn html_index_is_detected() {
        let root = content_root();
        fs::write(root.path().join("docs/index.html"), "<p>hi</p>").unwrap();
        let resolved = resolve(root.path(), "docs/").unwrap();
        assert_eq!(
            resolved,
            Resolution::Directory {
                dir: root.path().join("docs"),
                html_index: Some(root.path().join("docs/index.html")),
            }
        );
    }

    #[test]
    fn empty_path_resolves_index() {
        let root = content_root();
        fs::write(root.path().join("index.md"), "# Home").unwrap();
        let resolved = resolve(root.path(), "").unwrap();
        assert_eq!(
            resolved,
            Resolution::Page {
                stem: root.path().join("index")
            }
        );
    }

    #[test]
    fn absolute_paths_fail_closed_without_a_read() {
        let root = content_root();
        assert!(matches!(
            resolve(root.path(), "/etc/passwd"),
            Err(ServeError::Containment)
        ));
    }

    #[test]
    fn parent_components_fail_closed() {
        let root = content_root();
        assert!(matches!(
            resolve(root.path(), "../secrets"),
            Err(ServeError::Containment)
        ));
        assert!(matches!(
            resolve(root.path(), "docs/../../secrets"),
            Err(ServeError::Containment)
        ));
    }

    #[test]
    fn unknown_path_is_not_found() {
        let root = content_root();
        assert_eq!(resolve(root.path(), "nope").unwrap(), Resolution::NotFound);
    }
}
