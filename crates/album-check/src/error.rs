//! Failures a single check can report
//!
//! Every variant is attributable to one check and carries the expected and
//! actual values needed to fix either the fixture table or the generator.

use camino::Utf8PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The page was never generated
    #[error("expected page {path} does not exist")]
    NotFound { path: Utf8PathBuf },

    #[error("page path {path:?} escapes the output root")]
    PathEscapesRoot { path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("title {actual:?} does not contain {expected:?}")]
    TitleMismatch { expected: String, actual: String },

    #[error(
        "first h1 {} does not contain any of {expected:?}",
        quoted_or(.actual, "(missing)")
    )]
    HeadingMismatch {
        expected: Vec<String>,
        actual: Option<String>,
    },

    #[error("no a.gallery-item links to {image:?}")]
    ImageLinkMissing { image: String },

    #[error("{count} a.gallery-item elements link to {image:?}, expected exactly one")]
    DuplicateImageLink { image: String, count: usize },

    #[error("gallery item for {image:?} contains {count} img elements, expected exactly one")]
    GalleryImageCount { image: String, count: usize },

    #[error("no element contains the text {text:?}")]
    TextNotFound { text: String },

    #[error("no .card with an h2 containing {label:?}")]
    CardMissing { label: String },

    #[error("{count} .card elements have an h2 containing {label:?}, expected exactly one")]
    DuplicateCard { label: String, count: usize },

    #[error(
        "card {label:?} links to {}, expected {expected:?}",
        quoted_or(.actual, "nothing (no href)")
    )]
    CardUrlMismatch {
        label: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("check did not finish within {}s", .limit.as_secs_f64())]
    Timeout { limit: Duration },

    #[error("check panicked: {message}")]
    Panicked { message: String },
}

fn quoted_or(value: &Option<String>, missing: &str) -> String {
    match value {
        Some(value) => format!("{value:?}"),
        None => missing.to_string(),
    }
}

impl CheckError {
    /// Short machine-friendly name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::NotFound { .. } => "NotFound",
            CheckError::PathEscapesRoot { .. } => "PathEscapesRoot",
            CheckError::Io { .. } => "Io",
            CheckError::TitleMismatch { .. } => "TitleMismatch",
            CheckError::HeadingMismatch { .. } => "HeadingMismatch",
            CheckError::ImageLinkMissing { .. } => "ImageLinkMissing",
            CheckError::DuplicateImageLink { .. } => "DuplicateImageLink",
            CheckError::GalleryImageCount { .. } => "GalleryImageCount",
            CheckError::TextNotFound { .. } => "TextNotFound",
            CheckError::CardMissing { .. } => "CardMissing",
            CheckError::DuplicateCard { .. } => "DuplicateCard",
            CheckError::CardUrlMismatch { .. } => "CardUrlMismatch",
            CheckError::Timeout { .. } => "Timeout",
            CheckError::Panicked { .. } => "Panicked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_url_mismatch_without_href() {
        let err = CheckError::CardUrlMismatch {
            label: "People".to_string(),
            expected: "/people/".to_string(),
            actual: None,
        };
        assert_eq!(
            err.to_string(),
            r#"card "People" links to nothing (no href), expected "/people/""#
        );
        assert_eq!(err.kind(), "CardUrlMismatch");
    }

    #[test]
    fn heading_mismatch_shows_actual_heading() {
        let err = CheckError::HeadingMismatch {
            expected: vec!["London".to_string()],
            actual: Some("Berlin".to_string()),
        };
        assert_eq!(
            err.to_string(),
            r#"first h1 "Berlin" does not contain any of ["London"]"#
        );
    }
}
