//! A small read-only document model for generated pages
//!
//! Pages are parsed with html5ever (so malformed template output is repaired
//! the same way a browser would repair it) and converted into an owned tree
//! that the assertions can walk without touching `Rc`/`RefCell` handles.

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Elements whose text is never shown to a reader
const NON_RENDERED: &[&str] = &["head", "script", "style", "template", "noscript"];

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase local name (e.g. "a", "h1")
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A parsed HTML document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse a complete HTML document; invalid UTF-8 is replaced rather
    /// than rejected, as a browser would
    pub fn parse(html: impl AsRef<[u8]>) -> std::io::Result<Self> {
        let dom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut html.as_ref())?;

        let nodes = dom
            .document
            .children
            .borrow()
            .iter()
            .filter_map(convert_rcdom_node)
            .collect();

        Ok(Self { nodes })
    }

    /// All elements in document order
    pub fn elements(&self) -> Descendants<'_> {
        Descendants::new(&self.nodes)
    }

    /// First element with the given tag name, in document order
    pub fn first(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.name == name)
    }

    /// The document title as a browser reports it (whitespace collapsed)
    pub fn title(&self) -> String {
        self.first("title")
            .map(|el| normalize_whitespace(&el.text_content()))
            .unwrap_or_default()
    }

    /// The `<body>` element, if the parser produced one
    pub fn body(&self) -> Option<&Element> {
        self.first("body")
    }
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the `class` attribute lists `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(&self.children)
    }

    /// Concatenated text of all descendant text nodes (DOM `textContent`)
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, false, &mut out);
        out
    }

    /// Like [`Element::text_content`], but skips scripts, styles and other
    /// elements a reader never sees
    pub fn rendered_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, true, &mut out);
        out
    }
}

/// Pre-order walk over elements
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Descendants<'a> {
    fn new(nodes: &'a [Node]) -> Self {
        let stack = nodes
            .iter()
            .rev()
            .filter_map(|node| match node {
                Node::Element(el) => Some(el),
                Node::Text(_) => None,
            })
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let el = self.stack.pop()?;
        self.stack.extend(el.child_elements().rev());
        Some(el)
    }
}

/// Collapse whitespace runs to single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(el: &Element, rendered_only: bool, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => {
                if rendered_only && NON_RENDERED.contains(&child.name.as_str()) {
                    continue;
                }
                collect_text(child, rendered_only, out);
            }
        }
    }
}

/// Convert an rcdom handle into an owned node; comments, doctypes and
/// processing instructions are dropped
fn convert_rcdom_node(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();

            let children = handle
                .children
                .borrow()
                .iter()
                .filter_map(convert_rcdom_node)
                .collect();

            Some(Node::Element(Element {
                name: name.local.to_string(),
                attrs,
                children,
            }))
        }
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>
    London | Hugo Photoalbum Test
  </title>
  <style>h1 { color: red; }</style>
</head>
<body>
  <h1>Tagged   with <em>London</em></h1>
  <a class="gallery-item featured" href="/places/london/pub.webp"><figure><img src="pub-thumb.webp"></figure></a>
  <script>var hidden = "Secret";</script>
</body>
</html>"#;

    #[test]
    fn title_is_whitespace_normalized() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(doc.title(), "London | Hugo Photoalbum Test");
    }

    #[test]
    fn first_heading_includes_nested_text() {
        let doc = Document::parse(PAGE).unwrap();
        let h1 = doc.first("h1").unwrap();
        assert_eq!(normalize_whitespace(&h1.text_content()), "Tagged with London");
    }

    #[test]
    fn elements_are_in_document_order() {
        let doc = Document::parse(PAGE).unwrap();
        let names: Vec<_> = doc
            .body()
            .unwrap()
            .descendants()
            .map(|el| el.name.as_str())
            .collect();
        assert_eq!(names, ["h1", "em", "a", "figure", "img", "script"]);
    }

    #[test]
    fn class_list_matching_is_per_token() {
        let doc = Document::parse(PAGE).unwrap();
        let a = doc.first("a").unwrap();
        assert!(a.has_class("gallery-item"));
        assert!(a.has_class("featured"));
        assert!(!a.has_class("gallery"));
        assert_eq!(a.attr("href"), Some("/places/london/pub.webp"));
    }

    #[test]
    fn rendered_text_skips_scripts() {
        let doc = Document::parse(PAGE).unwrap();
        let body = doc.body().unwrap();
        assert!(body.text_content().contains("Secret"));
        assert!(!body.rendered_text().contains("Secret"));
    }

    #[test]
    fn stray_latin1_bytes_are_replaced() {
        let mut bytes = b"<title>Caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b" London</title>");
        let doc = Document::parse(&bytes).unwrap();
        assert_eq!(doc.title(), "Caf\u{FFFD} London");
    }

    #[test]
    fn parser_repairs_missing_structure() {
        let doc = Document::parse("<title>Bare</title><h1>Only a heading").unwrap();
        assert_eq!(doc.title(), "Bare");
        assert!(doc.body().is_some());
        assert_eq!(doc.first("h1").unwrap().text_content(), "Only a heading");
    }
}
