//! HTML document capability used by the extractors
//!
//! The extractors never see `scraper` types directly. They work against a
//! [`Document`] and its [`Node`]s, which expose just text, attributes, children
//! and structural selection. Callers branch on presence, not on node kind.

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses raw response bytes; invalid UTF-8 is replaced, never rejected
    pub fn parse(bytes: &[u8]) -> Self {
        Self::parse_str(&String::from_utf8_lossy(bytes))
    }

    pub fn parse_str(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Every element matching `selector`, in document order
    pub fn select<'a>(&'a self, selector: &Selector) -> Vec<Node<'a>> {
        self.html.select(selector).map(Node::Element).collect()
    }

    /// The first element matching `selector`
    pub fn select_first<'a>(&'a self, selector: &Selector) -> Option<Node<'a>> {
        self.html.select(selector).next().map(Node::Element)
    }
}

/// One node of a parsed document: an element or a run of text
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

impl<'a> Node<'a> {
    /// All text beneath this node, concatenated and left unnormalized
    pub fn text(&self) -> String {
        match self {
            Self::Element(element) => element.text().collect(),
            Self::Text(text) => (*text).to_string(),
        }
    }

    /// [`Node::text`] with whitespace collapsed
    pub fn normalized_text(&self) -> String {
        normalize_whitespace(&self.text())
    }

    /// Attribute value; text nodes have none
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        match self {
            Self::Element(element) => element.value().attr(name),
            Self::Text(_) => None,
        }
    }

    /// Direct element and text children in document order
    ///
    /// Comments and processing instructions are left out.
    pub fn children(&self) -> Vec<Node<'a>> {
        let Self::Element(element) = self else {
            return Vec::new();
        };

        element
            .children()
            .filter_map(|child| match child.value() {
                scraper::Node::Element(_) => ElementRef::wrap(child).map(Node::Element),
                scraper::Node::Text(text) => Some(Node::Text(&**text)),
                _ => None,
            })
            .collect()
    }

    /// Descendant elements matching `selector`, in document order
    pub fn select(&self, selector: &Selector) -> Vec<Node<'a>> {
        match self {
            Self::Element(element) => element.select(selector).map(Node::Element).collect(),
            Self::Text(_) => Vec::new(),
        }
    }

    /// The first descendant element matching `selector`
    pub fn select_first(&self, selector: &Selector) -> Option<Node<'a>> {
        match self {
            Self::Element(element) => element.select(selector).next().map(Node::Element),
            Self::Text(_) => None,
        }
    }
}

/// Collapses every whitespace run (including non-breaking spaces) to one space and trims
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(css: &str) -> Selector {
        Selector::parse(css).unwrap()
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Иван \n\t Иванович  "), "Иван Иванович");
        assert_eq!(normalize_whitespace("a\u{a0}\u{a0}b"), "a b");
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn test_select_in_document_order() {
        let doc = Document::parse_str(r#"<ul><li>one</li><li>two</li><li>three</li></ul>"#);
        let items: Vec<String> = doc.select(&selector("li")).iter().map(|n| n.text()).collect();
        assert_eq!(items, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_attr() {
        let doc = Document::parse_str(r#"<a href="/x" class="card">go</a>"#);
        let link = doc.select_first(&selector("a")).unwrap();
        assert_eq!(link.attr("href"), Some("/x"));
        assert_eq!(link.attr("title"), None);
    }

    #[test]
    fn test_children_include_text_nodes() {
        let doc = Document::parse_str(r#"<h1>Иванов <span>Иван</span><!-- c --></h1>"#);
        let title = doc.select_first(&selector("h1")).unwrap();
        let children = title.children();

        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], Node::Text(_)));
        assert_eq!(children[0].text(), "Иванов ");
        assert!(matches!(children[1], Node::Element(_)));
        assert_eq!(children[1].text(), "Иван");
    }

    #[test]
    fn test_text_node_has_no_children_or_attrs() {
        let doc = Document::parse_str(r#"<p>plain</p>"#);
        let paragraph = doc.select_first(&selector("p")).unwrap();
        let text = paragraph.children()[0];

        assert!(text.children().is_empty());
        assert_eq!(text.attr("href"), None);
        assert!(text.select(&selector("p")).is_empty());
    }

    #[test]
    fn test_parse_lossy_bytes() {
        let doc = Document::parse(b"<p>ok \xff</p>");
        let paragraph = doc.select_first(&selector("p")).unwrap();
        assert!(paragraph.text().starts_with("ok"));
    }

    #[test]
    fn test_nested_select_excludes_outside() {
        let doc = Document::parse_str(
            r#"<div id="a"><p>inside</p></div><p>outside</p>"#,
        );
        let container = doc.select_first(&selector("#a")).unwrap();
        let paragraphs = container.select(&selector("p"));
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text(), "inside");
    }
}
