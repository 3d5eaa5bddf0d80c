//! Structural assertions over a loaded page
//!
//! Text comparisons collapse whitespace first, since templates indent freely.
//! Titles, headings, hrefs of gallery items and free text match by
//! substring; card labels match by substring ignoring case; navigation card
//! hrefs must match exactly.

use crate::dom::{Document, Element, normalize_whitespace};
use crate::error::CheckError;
use crate::fixtures::NavCard;

const GALLERY_ITEM_CLASS: &str = "gallery-item";
const CARD_CLASS: &str = "card";

/// The document title must contain `expected`
pub fn assert_title(doc: &Document, expected: &str) -> Result<(), CheckError> {
    let actual = doc.title();
    if actual.contains(expected) {
        Ok(())
    } else {
        Err(CheckError::TitleMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}

/// The first h1 must contain at least one of `candidates`
pub fn assert_heading(doc: &Document, candidates: &[String]) -> Result<(), CheckError> {
    let actual = doc
        .first("h1")
        .map(|h1| normalize_whitespace(&h1.text_content()));

    let matched = actual
        .as_deref()
        .is_some_and(|text| candidates.iter().any(|c| text.contains(c.as_str())));

    if matched {
        Ok(())
    } else {
        Err(CheckError::HeadingMismatch {
            expected: candidates.to_vec(),
            actual,
        })
    }
}

/// Exactly one `a.gallery-item` links to `image`, and it wraps exactly one `img`
pub fn assert_gallery_image(doc: &Document, image: &str) -> Result<(), CheckError> {
    let items: Vec<&Element> = doc
        .elements()
        .filter(|el| {
            el.name == "a"
                && el.has_class(GALLERY_ITEM_CLASS)
                && el.attr("href").is_some_and(|href| href.contains(image))
        })
        .collect();

    let item = match items.as_slice() {
        [item] => item,
        [] => {
            return Err(CheckError::ImageLinkMissing {
                image: image.to_string(),
            });
        }
        _ => {
            return Err(CheckError::DuplicateImageLink {
                image: image.to_string(),
                count: items.len(),
            });
        }
    };

    let images = item.descendants().filter(|el| el.name == "img").count();
    if images == 1 {
        Ok(())
    } else {
        Err(CheckError::GalleryImageCount {
            image: image.to_string(),
            count: images,
        })
    }
}

/// Some element in the page body shows `text`
pub fn assert_text_present(doc: &Document, text: &str) -> Result<(), CheckError> {
    let needle = normalize_whitespace(text);
    let found = doc
        .body()
        .is_some_and(|body| normalize_whitespace(&body.rendered_text()).contains(&needle));

    if found {
        Ok(())
    } else {
        Err(CheckError::TextNotFound {
            text: text.to_string(),
        })
    }
}

/// Exactly one `.card` has an h2 containing the label, and it links to the
/// expected url verbatim
pub fn assert_nav_card(doc: &Document, card: &NavCard) -> Result<(), CheckError> {
    let matches: Vec<&Element> = doc
        .elements()
        .filter(|el| el.has_class(CARD_CLASS) && card_has_label(el, &card.label))
        .collect();

    let found = match matches.as_slice() {
        [found] => found,
        [] => {
            return Err(CheckError::CardMissing {
                label: card.label.clone(),
            });
        }
        _ => {
            return Err(CheckError::DuplicateCard {
                label: card.label.clone(),
                count: matches.len(),
            });
        }
    };

    match found.attr("href") {
        Some(href) if href == card.url => Ok(()),
        actual => Err(CheckError::CardUrlMismatch {
            label: card.label.clone(),
            expected: card.url.clone(),
            actual: actual.map(str::to_string),
        }),
    }
}

/// Labels match case-insensitively, so `PEOPLE` rendered by a theme that
/// uppercases headings still counts as the `People` card
fn card_has_label(card: &Element, label: &str) -> bool {
    let label = normalize_whitespace(label).to_lowercase();
    card.descendants()
        .filter(|el| el.name == "h2")
        .any(|h2| {
            normalize_whitespace(&h2.text_content())
                .to_lowercase()
                .contains(&label)
        })
}
