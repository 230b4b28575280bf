//! Navigation outline definitions.
//!
//! An [`Outline`] is the fixed literal that the sidebar injects into itself on
//! every page load. The book outline of the documented CLI is compiled into the
//! binary; custom outlines can be loaded from JSON or YAML files with the same
//! shape.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const EMBEDDED_OUTLINE: &str = include_str!("../assets/book_outline.json");

/// Errors surfaced while loading an outline file.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// The outline file could not be read.
    #[error("outline I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The JSON payload did not match the outline shape.
    #[error("outline JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The YAML payload did not match the outline shape.
    #[error("outline YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The file extension is neither JSON nor YAML.
    #[error("unsupported outline format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// Ordered, nested navigation content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Top-level entries in display order.
    #[serde(default)]
    pub entries: Vec<OutlineEntry>,
}

/// A single row of the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutlineEntry {
    /// A page entry, optionally holding a nested section of child entries.
    Chapter {
        /// Section number shown before the label (for example `2.1`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        number: Option<String>,
        /// Display label.
        label: String,
        /// Relative target path. `None` marks a draft chapter with no page yet.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        href: Option<String>,
        /// Nested entries rendered as a collapsible section.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<OutlineEntry>,
    },
    /// A non-clickable heading separating groups of chapters.
    PartTitle {
        /// Heading text.
        label: String,
    },
    /// A visual spacer between groups of chapters.
    Separator,
}

impl OutlineEntry {
    /// Convenience constructor for a linked chapter without children.
    pub fn page(number: impl Into<String>, label: impl Into<String>, href: impl Into<String>) -> Self {
        Self::Chapter {
            number: Some(number.into()),
            label: label.into(),
            href: Some(href.into()),
            children: Vec::new(),
        }
    }

    /// Convenience constructor for a linked chapter with nested children.
    pub fn section(
        number: impl Into<String>,
        label: impl Into<String>,
        href: impl Into<String>,
        children: Vec<OutlineEntry>,
    ) -> Self {
        Self::Chapter {
            number: Some(number.into()),
            label: label.into(),
            href: Some(href.into()),
            children,
        }
    }
}

impl Outline {
    /// Returns the outline compiled into the binary.
    pub fn embedded() -> Result<Self, OutlineError> {
        Ok(serde_json::from_str(EMBEDDED_OUTLINE)?)
    }

    /// Loads an outline from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: &Path) -> Result<Self, OutlineError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let contents = fs::read_to_string(path)?;
        match extension.as_str() {
            "json" => Ok(serde_json::from_str(&contents)?),
            "yaml" | "yml" => Ok(serde_yaml::from_str(&contents)?),
            other => Err(OutlineError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Counts linked chapters across all nesting levels.
    pub fn link_count(&self) -> usize {
        fn count(entries: &[OutlineEntry]) -> usize {
            entries
                .iter()
                .map(|entry| match entry {
                    OutlineEntry::Chapter { href, children, .. } => usize::from(href.is_some()) + count(children),
                    _ => 0,
                })
                .sum()
        }
        count(&self.entries)
    }
}

/// Controls which sections start collapsed and whether they get toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldConfig {
    /// When `false`, every chapter starts expanded and no toggle is rendered.
    #[serde(default)]
    pub enable: bool,
    /// Deepest 1-based nesting level whose chapters start expanded. `0` folds everything.
    #[serde(default)]
    pub level: u32,
}

impl FoldConfig {
    /// Folding enabled with the given open level.
    pub fn folded(level: u32) -> Self {
        Self { enable: true, level }
    }

    /// Whether a chapter item at the 1-based `level` starts expanded.
    pub fn starts_expanded(&self, level: u32) -> bool {
        !self.enable || level <= self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_outline_parses() {
        let outline = Outline::embedded().expect("embedded outline");
        assert_eq!(outline.entries.len(), 11);
        assert_eq!(outline.link_count(), 34);
        match &outline.entries[0] {
            OutlineEntry::Chapter { label, href, .. } => {
                assert_eq!(label, "Introduction");
                assert_eq!(href.as_deref(), Some("introduction.html"));
            }
            other => panic!("unexpected first entry: {other:?}"),
        }
    }

    #[test]
    fn yaml_outline_with_drafts_and_parts() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "entries:\n  - kind: part_title\n    label: Guide\n  - kind: chapter\n    label: Later\n  - kind: separator\n"
        )
        .unwrap();

        let outline = Outline::from_path(file.path()).unwrap();
        assert_eq!(outline.entries.len(), 3);
        assert_eq!(outline.link_count(), 0);
        assert!(matches!(outline.entries[1], OutlineEntry::Chapter { href: None, .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let error = Outline::from_path(file.path()).unwrap_err();
        assert!(matches!(error, OutlineError::UnsupportedFormat(ext) if ext == "toml"));
    }

    #[test]
    fn fold_levels() {
        assert!(FoldConfig::default().starts_expanded(5));
        let folded = FoldConfig::folded(1);
        assert!(folded.starts_expanded(1));
        assert!(!folded.starts_expanded(2));
        assert!(!FoldConfig::folded(0).starts_expanded(1));
    }
}
