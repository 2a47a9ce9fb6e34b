//! Permissive DOM parsing helpers.
//!
//! Pasted fragments are parsed with a full HTML5 tree builder, so
//! recoverable markup errors (unclosed tags, stray end tags) never raise;
//! the tree builder repairs them the way a browser would.

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse a complete HTML document into a DOM tree.
pub fn parse_html(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

/// Parse an HTML fragment by wrapping it in a minimal document skeleton.
pub fn parse_fragment(html: &str) -> RcDom {
    let wrapped = format!(
        "<!DOCTYPE html><html><head></head><body>{}</body></html>",
        html
    );
    parse_html(&wrapped)
}

/// Find the first element with the given tag name (depth-first).
pub fn find_first_element(handle: &Handle, tag_name: &str) -> Option<Handle> {
    if let NodeData::Element { ref name, .. } = handle.data {
        if name.local.as_ref() == tag_name {
            return Some(handle.clone());
        }
    }

    for child in handle.children.borrow().iter() {
        if let Some(found) = find_first_element(child, tag_name) {
            return Some(found);
        }
    }

    None
}

/// Find the first element whose tag name is any of `tag_names`, in
/// document order.
pub fn find_first_of(handle: &Handle, tag_names: &[&str]) -> Option<Handle> {
    if let NodeData::Element { ref name, .. } = handle.data {
        if tag_names.contains(&name.local.as_ref()) {
            return Some(handle.clone());
        }
    }

    for child in handle.children.borrow().iter() {
        if let Some(found) = find_first_of(child, tag_names) {
            return Some(found);
        }
    }

    None
}

/// Collect every element with the given tag name, in document order.
pub fn find_all_elements(handle: &Handle, tag_name: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_elements(handle, tag_name, &mut found);
    found
}

fn collect_elements(handle: &Handle, tag_name: &str, found: &mut Vec<Handle>) {
    if let NodeData::Element { ref name, .. } = handle.data {
        if name.local.as_ref() == tag_name {
            found.push(handle.clone());
        }
    }

    for child in handle.children.borrow().iter() {
        collect_elements(child, tag_name, found);
    }
}

/// Get the text content of a node and its descendants.
pub fn get_text_content(handle: &Handle) -> String {
    let mut text = String::new();
    get_text_recursive(handle, &mut text);
    text
}

fn get_text_recursive(handle: &Handle, text: &mut String) {
    match handle.data {
        NodeData::Text { ref contents } => {
            text.push_str(&contents.borrow());
        }
        _ => {
            for child in handle.children.borrow().iter() {
                get_text_recursive(child, text);
            }
        }
    }
}

/// Get an attribute value from an element node.
pub fn get_attribute(handle: &Handle, attr_name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref() == attr_name {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_builds_a_body() {
        let dom = parse_fragment("<p>Hello</p>");
        let body = find_first_element(&dom.document, "body").expect("Missing body");
        assert_eq!(get_text_content(&body), "Hello");
    }

    #[test]
    fn test_parse_fragment_recovers_from_unclosed_tags() {
        let dom = parse_fragment("<p>one <b>two</p><p>three</p>");
        let body = find_first_element(&dom.document, "body").expect("Missing body");
        assert!(get_text_content(&body).contains("three"));
    }

    #[test]
    fn test_find_first_of_document_order() {
        let dom = parse_fragment("<h3>first</h3><h1>second</h1>");
        let heading = find_first_of(&dom.document, &["h1", "h2", "h3"])
            .expect("Missing heading");
        assert_eq!(get_text_content(&heading), "first");
    }

    #[test]
    fn test_find_all_elements() {
        let dom = parse_fragment("<p>a</p><div><p>b</p></div><p>c</p>");
        let paragraphs = find_all_elements(&dom.document, "p");
        let texts: Vec<String> = paragraphs.iter().map(get_text_content).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_get_attribute() {
        let dom = parse_fragment(r#"<a href="https://example.com">link</a>"#);
        let link = find_first_element(&dom.document, "a").expect("Missing link");
        assert_eq!(
            get_attribute(&link, "href").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(get_attribute(&link, "title"), None);
    }
}
