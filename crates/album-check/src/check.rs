//! Named checks built from a fixture table
//!
//! One page fixture or one navigation fixture becomes one check. A check
//! loads its page first; only once that succeeds do the content assertions
//! run, and all of them run so a single report shows every problem.

use crate::assertions::{
    assert_gallery_image, assert_heading, assert_nav_card, assert_text_present, assert_title,
};
use crate::error::CheckError;
use crate::fixtures::{FixtureTable, NavFixture, PageFixture};
use crate::page::resolve_and_load;
use camino::Utf8Path;

#[derive(Debug, Clone)]
pub enum CheckKind {
    Page(PageFixture),
    Nav(NavFixture),
}

/// A single check
#[derive(Debug, Clone)]
pub struct Check {
    /// Full name, e.g. `album::places/london`
    pub name: String,
    pub kind: CheckKind,
    pub ignored: bool,
}

impl Check {
    pub fn page(fixture: PageFixture) -> Self {
        let name = fixture
            .name
            .clone()
            .unwrap_or_else(|| format!("album::{}", fixture.path));
        Self {
            name,
            ignored: fixture.ignored,
            kind: CheckKind::Page(fixture),
        }
    }

    pub fn nav(fixture: NavFixture) -> Self {
        let name = fixture
            .name
            .clone()
            .unwrap_or_else(|| format!("subalbums::{}", fixture.path));
        Self {
            name,
            ignored: fixture.ignored,
            kind: CheckKind::Nav(fixture),
        }
    }

    /// Site path of the page this check inspects
    pub fn path(&self) -> &str {
        match &self.kind {
            CheckKind::Page(fixture) => &fixture.path,
            CheckKind::Nav(fixture) => &fixture.path,
        }
    }

    pub fn matches(&self, filter: Option<&str>) -> bool {
        filter.is_none_or(|f| self.name.contains(f))
    }

    /// Load the page under `root` and run every assertion for this check
    pub fn run(&self, root: &Utf8Path) -> Verdict {
        let doc = match resolve_and_load(root, self.path()) {
            Ok(doc) => doc,
            Err(e) => return Verdict::failed(e),
        };

        let results: Vec<Result<(), CheckError>> = match &self.kind {
            CheckKind::Page(fixture) => {
                let mut results = Vec::new();
                if let Some(primary) = fixture.title_contains.first() {
                    results.push(assert_title(&doc, primary));
                }
                if !fixture.heading_contains_any.is_empty() {
                    results.push(assert_heading(&doc, &fixture.heading_contains_any));
                }
                results.extend(
                    fixture
                        .images
                        .iter()
                        .map(|image| assert_gallery_image(&doc, image)),
                );
                results.extend(
                    fixture
                        .key_texts
                        .iter()
                        .map(|text| assert_text_present(&doc, text)),
                );
                results
            }
            CheckKind::Nav(fixture) => fixture
                .cards
                .iter()
                .map(|card| assert_nav_card(&doc, card))
                .collect(),
        };

        Verdict {
            failures: results.into_iter().filter_map(Result::err).collect(),
        }
    }
}

/// Outcome of running one check
#[derive(Debug, Default)]
pub struct Verdict {
    pub failures: Vec<CheckError>,
}

impl Verdict {
    pub fn failed(error: CheckError) -> Self {
        Self {
            failures: vec![error],
        }
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// All checks described by a table, pages first, in table order
pub fn collect_checks(table: &FixtureTable) -> Vec<Check> {
    table
        .pages
        .iter()
        .cloned()
        .map(Check::page)
        .chain(table.navigation.iter().cloned().map(Check::nav))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn builtin_check_names() {
        let table = FixtureTable::builtin().unwrap();
        let names: Vec<String> = collect_checks(&table)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names.len(), 17);
        assert_eq!(names[0], "album::places/london");
        assert!(names.contains(&"homepage::title".to_string()));
        assert!(names.contains(&"homepage::albums".to_string()));
        assert!(names.contains(&"subalbums::/all/".to_string()));
    }

    #[test]
    fn filter_matches_substrings_of_full_name() {
        let table = FixtureTable::builtin().unwrap();
        let checks = collect_checks(&table);
        let berlin: Vec<_> = checks
            .iter()
            .filter(|c| c.matches(Some("berlin")))
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(berlin, ["album::places/berlin", "album::travel/berlin-2020"]);
        assert_eq!(checks.iter().filter(|c| c.matches(None)).count(), 17);
    }

    #[test]
    fn missing_page_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let table = FixtureTable::builtin().unwrap();
        let check = Check::page(table.pages[0].clone());

        let verdict = check.run(&root);
        assert!(!verdict.passed());
        assert_eq!(verdict.failures.len(), 1);
        assert_eq!(verdict.failures[0].kind(), "NotFound");
    }

    #[test]
    fn every_failed_assertion_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs_err::create_dir_all(root.join("all/2005")).unwrap();
        fs_err::write(
            root.join("all/2005/index.html"),
            "<title>Photos</title><h1>Photos</h1>",
        )
        .unwrap();

        let table = FixtureTable::builtin().unwrap();
        let fixture = table
            .pages
            .iter()
            .find(|p| p.path == "all/2005")
            .unwrap()
            .clone();
        let kinds: Vec<_> = Check::page(fixture)
            .run(&root)
            .failures
            .iter()
            .map(CheckError::kind)
            .collect();
        assert_eq!(
            kinds,
            ["TitleMismatch", "HeadingMismatch", "ImageLinkMissing", "TextNotFound"]
        );
    }
}
