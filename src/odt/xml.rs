//! Namespace-resolved XML element trees.
//!
//! ODT payloads are parsed once into a tree whose elements and attributes
//! carry an already-resolved [`Ns`] tag, so the walker matches on
//! `(Ns, local-name)` pairs instead of re-resolving prefixes per visit.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

const NS_OFFICE: &str = "urn:oasis:names:tc:opendocument:xmlns:office:1.0";
const NS_TEXT: &str = "urn:oasis:names:tc:opendocument:xmlns:text:1.0";
const NS_STYLE: &str = "urn:oasis:names:tc:opendocument:xmlns:style:1.0";
const NS_FO: &str = "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0";
const NS_DRAW: &str = "urn:oasis:names:tc:opendocument:xmlns:drawing:1.0";
const NS_META: &str = "urn:oasis:names:tc:opendocument:xmlns:meta:1.0";
const NS_TABLE: &str = "urn:oasis:names:tc:opendocument:xmlns:table:1.0";
const NS_XLINK: &str = "http://www.w3.org/1999/xlink";
const NS_DC: &str = "http://purl.org/dc/elements/1.1/";

/// The OpenDocument namespaces this engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ns {
    Office,
    Text,
    Style,
    Fo,
    Draw,
    Meta,
    Table,
    Xlink,
    Dc,
    /// Element or attribute without a namespace.
    None,
    /// Bound to a namespace this engine does not recognize.
    Other,
}

impl Ns {
    fn from_uri(uri: &[u8]) -> Ns {
        match std::str::from_utf8(uri).unwrap_or("") {
            NS_OFFICE => Ns::Office,
            NS_TEXT => Ns::Text,
            NS_STYLE => Ns::Style,
            NS_FO => Ns::Fo,
            NS_DRAW => Ns::Draw,
            NS_META => Ns::Meta,
            NS_TABLE => Ns::Table,
            NS_XLINK => Ns::Xlink,
            NS_DC => Ns::Dc,
            _ => Ns::Other,
        }
    }

    fn from_resolve(result: ResolveResult) -> Ns {
        match result {
            ResolveResult::Bound(Namespace(uri)) => Ns::from_uri(uri),
            ResolveResult::Unbound => Ns::None,
            ResolveResult::Unknown(_) => Ns::Other,
        }
    }
}

/// A child of an element: nested element or character data.
#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct XmlAttribute {
    pub ns: Ns,
    pub local: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct XmlElement {
    pub ns: Ns,
    pub local: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn is(&self, ns: Ns, local: &str) -> bool {
        self.ns == ns && self.local == local
    }

    /// Value of the first attribute matching the namespace and local name.
    pub fn attr(&self, ns: Ns, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.ns == ns && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Direct element children, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element matching the namespace and local name.
    pub fn child(&self, ns: Ns, local: &str) -> Option<&XmlElement> {
        self.child_elements().find(|el| el.is(ns, local))
    }

    /// First descendant element matching the namespace and local name,
    /// depth-first in document order.
    pub fn descendant(&self, ns: Ns, local: &str) -> Option<&XmlElement> {
        for el in self.child_elements() {
            if el.is(ns, local) {
                return Some(el);
            }
            if let Some(found) = el.descendant(ns, local) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated character data of all descendants, in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }
}

/// Parse an XML payload into an element tree.
///
/// Text is kept untrimmed: whitespace inside paragraph runs is
/// significant. Returns the parser's message on malformed input; the
/// caller wraps it with the entry name.
pub fn parse_tree(xml: &str) -> Result<XmlElement, String> {
    let mut reader = NsReader::from_str(xml);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = build_element(&reader, &e);
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = build_element(&reader, &e);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None if root.is_none() => root = Some(element),
                    None => {}
                }
            }
            Ok(Event::End(_)) => {
                let Some(element) = stack.pop() else {
                    return Err("unexpected closing tag".to_string());
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None if root.is_none() => root = Some(element),
                    None => {}
                }
            }
            Ok(Event::Text(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(resolved) = resolve_entity(e.as_ref()) {
                    push_text(&mut stack, &resolved);
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, PIs and doctypes carry no content
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }

    root.ok_or_else(|| "no root element".to_string())
}

fn build_element(reader: &NsReader<&[u8]>, start: &BytesStart) -> XmlElement {
    let (ns_result, local) = reader.resolve_element(start.name());
    let ns = Ns::from_resolve(ns_result);
    let local = String::from_utf8_lossy(local.as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes().with_checks(false).flatten() {
        // xmlns declarations are resolved into Ns tags, not stored
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (attr_ns, attr_local) = reader.resolve_attribute(attr.key);
        let value = match attr.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        attributes.push(XmlAttribute {
            ns: Ns::from_resolve(attr_ns),
            local: String::from_utf8_lossy(attr_local.as_ref()).into_owned(),
            value,
        });
    }

    XmlElement {
        ns,
        local,
        attributes,
        children: Vec::new(),
    }
}

fn push_text(stack: &mut Vec<XmlElement>, text: &str) {
    if text.is_empty() {
        return;
    }
    // Character data before the root element is dropped
    if let Some(parent) = stack.last_mut() {
        if let Some(XmlNode::Text(existing)) = parent.children.last_mut() {
            existing.push_str(text);
        } else {
            parent.children.push(XmlNode::Text(text.to_string()));
        }
    }
}

/// Resolve a general entity reference (name without `&`/`;`).
///
/// Handles the five predefined XML entities plus numeric character
/// references; anything else resolves to nothing.
fn resolve_entity(raw: &[u8]) -> Option<String> {
    let name = String::from_utf8_lossy(raw);
    let resolved = match name.as_ref() {
        "apos" => "'",
        "quot" => "\"",
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        other => return resolve_char_ref(other),
    };
    Some(resolved.to_string())
}

fn resolve_char_ref(name: &str) -> Option<String> {
    let digits = name.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code).map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content
    xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
    xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"
    xmlns:xlink="http://www.w3.org/1999/xlink">
  <office:body>
    <office:text>
      <text:p text:style-name="Standard">Hello <text:span text:style-name="Bold">world</text:span></text:p>
      <text:a xlink:href="https://example.com">link</text:a>
    </office:text>
  </office:body>
</office:document-content>"#;

    #[test]
    fn test_parse_resolves_namespaces() {
        let root = parse_tree(SAMPLE).expect("Failed to parse sample XML");
        assert!(root.is(Ns::Office, "document-content"));

        let body = root.child(Ns::Office, "body").expect("Missing office:body");
        let text = body.child(Ns::Office, "text").expect("Missing office:text");
        let para = text.child(Ns::Text, "p").expect("Missing text:p");
        assert_eq!(para.attr(Ns::Text, "style-name"), Some("Standard"));
    }

    #[test]
    fn test_text_concatenates_descendants() {
        let root = parse_tree(SAMPLE).expect("Failed to parse sample XML");
        let para = root.descendant(Ns::Text, "p").expect("Missing text:p");
        assert_eq!(para.text(), "Hello world");
    }

    #[test]
    fn test_descendant_finds_nested_elements() {
        let root = parse_tree(SAMPLE).expect("Failed to parse sample XML");
        let link = root.descendant(Ns::Text, "a").expect("Missing text:a");
        assert_eq!(link.attr(Ns::Xlink, "href"), Some("https://example.com"));
        assert_eq!(link.attr(Ns::Text, "href"), None);
    }

    #[test]
    fn test_unknown_namespace_classified_other() {
        let xml = r#"<x:doc xmlns:x="urn:something:else"><x:item/></x:doc>"#;
        let root = parse_tree(xml).expect("Failed to parse");
        assert_eq!(root.ns, Ns::Other);
        assert_eq!(root.local, "doc");
    }

    #[test]
    fn test_unprefixed_attribute_has_no_namespace() {
        let xml = r#"<doc plain="1"/>"#;
        let root = parse_tree(xml).expect("Failed to parse");
        assert_eq!(root.attr(Ns::None, "plain"), Some("1"));
    }

    #[test]
    fn test_entities_resolved_in_text() {
        let xml = "<doc>a &amp; b &lt;c&gt; &#8217;d&#x2019;</doc>";
        let root = parse_tree(xml).expect("Failed to parse");
        assert_eq!(root.text(), "a & b <c> \u{2019}d\u{2019}");
    }

    #[test]
    fn test_inline_whitespace_is_preserved() {
        let xml = "<doc><p>one <b>two</b> three</p></doc>";
        let root = parse_tree(xml).expect("Failed to parse");
        let para = root.descendant(Ns::None, "p").expect("Missing p");
        assert_eq!(para.text(), "one two three");
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(parse_tree("<doc><open></doc>").is_err());
        assert!(parse_tree("").is_err());
        assert!(parse_tree("just text").is_err());
    }
}
