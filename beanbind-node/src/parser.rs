//! Builds [`Element`] trees from XML text.

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};

use crate::{Attribute, Content, Element};

/// Error raised while building an element tree from XML text.
#[derive(Debug)]
pub enum ParseError {
    /// The underlying reader rejected the input.
    Xml(quick_xml::Error),
    /// A malformed attribute.
    Attribute(AttrError),
    /// A name or CDATA section was not valid UTF-8.
    Utf8(std::str::Utf8Error),
    /// The document has no root element.
    Empty,
    /// A second top-level element follows the root.
    MultipleRoots { tag: String },
    /// Non-whitespace text outside the root element.
    TextOutsideRoot { text: String },
    /// The input ended inside an element.
    Unclosed { tag: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Xml(err) => write!(f, "malformed XML: {err}"),
            ParseError::Attribute(err) => write!(f, "malformed attribute: {err}"),
            ParseError::Utf8(err) => write!(f, "invalid UTF-8: {err}"),
            ParseError::Empty => f.write_str("document has no root element"),
            ParseError::MultipleRoots { tag } => {
                write!(f, "unexpected second root element <{tag}>")
            }
            ParseError::TextOutsideRoot { text } => {
                write!(f, "unexpected text outside the root element: {text:?}")
            }
            ParseError::Unclosed { tag } => write!(f, "element <{tag}> is never closed"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Xml(err) => Some(err),
            ParseError::Attribute(err) => Some(err),
            ParseError::Utf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::Xml(err)
    }
}

impl From<AttrError> for ParseError {
    fn from(err: AttrError) -> Self {
        ParseError::Attribute(err)
    }
}

impl From<std::str::Utf8Error> for ParseError {
    fn from(err: std::str::Utf8Error) -> Self {
        ParseError::Utf8(err)
    }
}

/// Parse a complete XML document and return its root element.
///
/// Whitespace is preserved, comments, processing instructions and the
/// DOCTYPE are dropped, and CDATA sections become plain text.
pub fn parse(input: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                // quick-xml already checked that the end tag matches.
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element)?;
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                let text = std::str::from_utf8(&bytes)?;
                push_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed { tag: open.tag });
    }
    root.ok_or(ParseError::Empty)
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, ParseError> {
    let tag = std::str::from_utf8(start.name().as_ref())?.to_owned();
    let mut element = Element::new(tag);
    for attr in start.attributes() {
        let attr = attr?;
        let name = std::str::from_utf8(attr.key.as_ref())?.to_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attrs.push(Attribute { name, value });
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Content::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::MultipleRoots { tag: element.tag });
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), ParseError> {
    let Some(parent) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(ParseError::TextOutsideRoot {
            text: text.to_owned(),
        });
    };
    // Adjacent text and CDATA runs merge into one node.
    if let Some(Content::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.children.push(Content::Text(text.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn parse_simple_xml() {
        let elem = parse(r#"<root><child>hello</child></root>"#).unwrap();

        assert_eq!(elem.tag, "root");
        assert_eq!(elem.children.len(), 1);

        let child = elem.child_elements().next().unwrap();
        assert_eq!(child.tag, "child");
        assert_eq!(child.text_content(), "hello");
    }

    #[test]
    fn parse_with_attributes() {
        let elem =
            parse(r#"<root id="123" class="test"><child name="foo">bar</child></root>"#).unwrap();

        assert_eq!(elem.get_attr("id"), Some("123"));
        assert_eq!(elem.get_attr("class"), Some("test"));

        let child = elem.child_elements().next().unwrap();
        assert_eq!(child.get_attr("name"), Some("foo"));
        assert_eq!(child.text_content(), "bar");
    }

    #[test]
    fn parse_mixed_content_keeps_whitespace() {
        let elem = parse(r#"<p>Hello <b>world</b>!</p>"#).unwrap();

        assert_eq!(elem.children.len(), 3);
        assert_eq!(elem.children[0].as_text(), Some("Hello "));
        assert_eq!(elem.children[1].as_element().unwrap().tag, "b");
        assert_eq!(elem.children[2].as_text(), Some("!"));
        assert_eq!(elem.text_content(), "Hello world!");
    }

    #[test]
    fn parse_keeps_namespace_declarations_and_prefixes() {
        let elem = parse(
            r#"<jx:root xmlns:jx="http://example.com/jaxb" xmlns="urn:default"><jx:item/></jx:root>"#,
        )
        .unwrap();

        assert_eq!(elem.tag, "jx:root");
        assert_eq!(elem.local_name(), "root");
        assert_eq!(elem.get_attr("xmlns:jx"), Some("http://example.com/jaxb"));
        assert_eq!(elem.get_attr("xmlns"), Some("urn:default"));
        assert_eq!(elem.child_elements().next().unwrap().local_name(), "item");
    }

    #[test]
    fn parse_unescapes_entities_and_cdata() {
        let elem = parse(r#"<t a="x &amp; y">1 &lt; 2<![CDATA[ <raw> ]]></t>"#).unwrap();
        assert_eq!(elem.get_attr("a"), Some("x & y"));
        assert_eq!(elem.children.len(), 1);
        assert_eq!(elem.text_content(), "1 < 2 <raw> ");
    }

    #[test]
    fn parse_skips_prolog_and_comments() {
        let elem = parse("<?xml version=\"1.0\"?>\n<!-- note -->\n<root><!-- inner --></root>\n")
            .unwrap();
        assert_eq!(elem.tag, "root");
        assert!(elem.children.is_empty());
    }

    #[test]
    fn parse_rejects_empty_document() {
        assert!(matches!(parse("   "), Err(ParseError::Empty)));
    }

    #[test]
    fn parse_rejects_second_root() {
        let err = parse("<a/><b/>").unwrap_err();
        assert!(matches!(err, ParseError::MultipleRoots { ref tag } if tag == "b"));
    }

    #[test]
    fn parse_rejects_stray_text() {
        let err = parse("<a/>trailing").unwrap_err();
        assert!(matches!(err, ParseError::TextOutsideRoot { .. }));
    }

    #[test]
    fn parse_rejects_unclosed_element() {
        assert!(parse("<a><b></b>").is_err());
    }

    #[test]
    fn parse_rejects_mismatched_end_tag() {
        assert!(matches!(parse("<a></b>"), Err(ParseError::Xml(_))));
    }
}
