//! Locating and loading generated pages

use crate::dom::Document;
use crate::error::CheckError;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::ErrorKind;
use std::path::Component;
use tracing::debug;

const INDEX_FILE: &str = "index.html";

/// Map a site path (`places/london`, `/people/`, or `/` for the homepage)
/// to the `index.html` that should exist for it under `root`
pub fn resolve(root: &Utf8Path, relative_path: &str) -> Result<Utf8PathBuf, CheckError> {
    let trimmed = relative_path.trim_matches('/');
    let relative = Utf8Path::new(trimmed);

    let escapes = relative
        .as_std_path()
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(CheckError::PathEscapesRoot {
            path: relative_path.to_string(),
        });
    }

    Ok(root.join(relative).join(INDEX_FILE))
}

/// Resolve a site path and parse the page found there
pub fn resolve_and_load(root: &Utf8Path, relative_path: &str) -> Result<Document, CheckError> {
    let path = resolve(root, relative_path)?;

    if !path.is_file() {
        return Err(CheckError::NotFound { path });
    }

    let html = match fs_err::read(&path) {
        Ok(html) => html,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(CheckError::NotFound { path }),
        Err(source) => return Err(CheckError::Io { path, source }),
    };

    debug!("Loaded {path} ({} bytes)", html.len());

    Document::parse(&html).map_err(|source| CheckError::Io { path, source })
}
