//! Fixture tables: what the generator is expected to have produced
//!
//! A table is pure data. The built-in one describes the photo album test
//! site and lives in `fixtures/photoalbum.yaml`; other sites can be checked
//! by loading a table in the same format.

use camino::Utf8Path;
use eyre::{Result, WrapErr, bail};
use serde::Deserialize;
use std::path::Component;

const BUILTIN_TABLE: &str = include_str!("../fixtures/photoalbum.yaml");

/// Expected content of one generated page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPageFixture")]
pub struct PageFixture {
    /// Site-root-relative directory containing `index.html`
    pub path: String,
    /// Overrides the generated check name
    pub name: Option<String>,
    /// Candidate title substrings; the first one must appear
    pub title_contains: Vec<String>,
    /// The first h1 must contain at least one of these (skipped when empty)
    pub heading_contains_any: Vec<String>,
    /// Filenames that must each be linked from exactly one gallery item
    pub images: Vec<String>,
    /// Texts that must appear somewhere on the page
    pub key_texts: Vec<String>,
    pub ignored: bool,
}

/// The YAML shape of a page entry, where `key_texts` stands in for the
/// title and heading lists unless they are spelled out
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPageFixture {
    path: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<Vec<String>>,
    #[serde(default)]
    heading: Option<Vec<String>>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    key_texts: Vec<String>,
    #[serde(default)]
    ignored: bool,
}

impl From<RawPageFixture> for PageFixture {
    fn from(raw: RawPageFixture) -> Self {
        Self {
            title_contains: raw.title.unwrap_or_else(|| raw.key_texts.clone()),
            heading_contains_any: raw.heading.unwrap_or_else(|| raw.key_texts.clone()),
            path: raw.path,
            name: raw.name,
            images: raw.images,
            key_texts: raw.key_texts,
            ignored: raw.ignored,
        }
    }
}

/// A link card expected on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavCard {
    /// Text the card's h2 must contain
    pub label: String,
    /// Exact href of the card
    pub url: String,
}

/// Navigation cards expected on one listing page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavFixture {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    pub cards: Vec<NavCard>,
    #[serde(default)]
    pub ignored: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureTable {
    #[serde(default)]
    pub pages: Vec<PageFixture>,
    #[serde(default)]
    pub navigation: Vec<NavFixture>,
}

impl FixtureTable {
    /// The table for the photo album test site
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_TABLE).wrap_err("built-in fixture table is invalid")
    }

    /// Load a table from a YAML file
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)?;
        let table = Self::from_yaml(&content).wrap_err_with(|| format!("in {path}"))?;
        tracing::info!(
            "Loaded {} page and {} navigation fixtures from {path}",
            table.pages.len(),
            table.navigation.len()
        );
        Ok(table)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let table: Self = serde_yaml::from_str(yaml).wrap_err("failed to parse fixture table")?;
        table.validate()?;
        Ok(table)
    }

    /// Reject entries that could never pass or that point outside the output tree
    pub fn validate(&self) -> Result<()> {
        for page in &self.pages {
            check_relative(&page.path)?;
            if page.title_contains.is_empty() {
                bail!(
                    "page fixture {:?} has no title text (set `title` or `key_texts`)",
                    page.path
                );
            }
        }

        for nav in &self.navigation {
            check_relative(&nav.path)?;
            for card in &nav.cards {
                if !card.url.starts_with('/') || !card.url.ends_with('/') {
                    bail!(
                        "card {:?} on {:?} must link to an absolute, slash-terminated url, got {:?}",
                        card.label,
                        nav.path,
                        card.url
                    );
                }
            }
        }

        Ok(())
    }
}

/// Site paths are written like URLs (`/people/`), so a leading slash is
/// allowed; what matters is that no component climbs out of the root.
fn check_relative(path: &str) -> Result<()> {
    let trimmed = path.trim_start_matches('/');
    let escapes = Utf8Path::new(trimmed)
        .as_std_path()
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        bail!("fixture path {path:?} escapes the output root");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_table_covers_the_photo_album() {
        let table = FixtureTable::builtin().unwrap();
        assert_eq!(table.pages.len(), 12);
        assert_eq!(table.navigation.len(), 5);

        let london = &table.pages[0];
        assert_eq!(london.path, "places/london");
        assert_eq!(london.title_contains[0], "London");
        assert_eq!(
            london.heading_contains_any,
            vec!["London".to_string(), "Tagged with London".to_string()]
        );
        assert_eq!(
            london.images,
            vec!["big-ben.webp", "pub.webp", "tower-bridge.webp"]
        );

        let homepage = table.pages.last().unwrap();
        assert_eq!(homepage.title_contains, vec!["Hugo Photoalbum Test"]);
        assert!(homepage.heading_contains_any.is_empty());
        assert!(homepage.key_texts.is_empty());

        let home_nav = &table.navigation[0];
        assert_eq!(
            home_nav.cards[3],
            NavCard {
                label: "Zeit".to_string(),
                url: "/all/".to_string()
            }
        );
    }

    #[test]
    fn numeric_labels_stay_strings() {
        let table = FixtureTable::builtin().unwrap();
        let zeit = table.navigation.iter().find(|n| n.path == "/all/").unwrap();
        assert_eq!(zeit.cards[0].label, "2004");
    }

    #[test]
    fn explicit_heading_overrides_key_texts() {
        let yaml = r#"
pages:
  - path: people/jane
    heading: [Jane]
    key_texts: [Jane Roe]
"#;
        let table = FixtureTable::from_yaml(yaml).unwrap();
        let page = &table.pages[0];
        assert_eq!(page.title_contains, vec!["Jane Roe"]);
        assert_eq!(page.heading_contains_any, vec!["Jane"]);
    }

    #[test]
    fn page_without_title_is_rejected() {
        let yaml = "pages:\n  - path: all/1999\n    images: [a.jpg]\n";
        let err = FixtureTable::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("no title text"), "{err}");
    }

    #[test]
    fn traversal_is_rejected() {
        let yaml = "pages:\n  - path: ../secrets\n    key_texts: [x]\n";
        assert!(FixtureTable::from_yaml(yaml).is_err());
    }

    #[test]
    fn relative_card_url_is_rejected() {
        let yaml = r#"
navigation:
  - path: /
    cards:
      - { label: People, url: people/ }
"#;
        let err = FixtureTable::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("slash-terminated"), "{err}");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "pages:\n  - path: a\n    key_text: [typo]\n";
        assert!(FixtureTable::from_yaml(yaml).is_err());
    }
}
