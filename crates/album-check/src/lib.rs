//! Verifies the output tree of a statically generated photo album
//!
//! A [`FixtureTable`] lists the pages the generator must have produced and
//! what each of them must show: a title, a top heading, gallery links to
//! specific images, some free text, and navigation cards to sub-albums.
//! Each entry becomes a [`Check`] that loads one `index.html` from the output
//! tree and asserts those facts against its parsed DOM.

pub mod assertions;
pub mod check;
pub mod config;
pub mod dom;
pub mod error;
pub mod fixtures;
pub mod page;
pub mod runner;

pub use check::{Check, CheckKind, Verdict, collect_checks};
pub use config::{Overrides, ResolvedConfig};
pub use dom::Document;
pub use error::CheckError;
pub use fixtures::{FixtureTable, NavCard, NavFixture, PageFixture};
pub use page::resolve_and_load;
pub use runner::{RunOptions, RunSummary, run_checks};
