use beanbind_node::{Content, Element, parse};
use facet_testhelpers::test;
use indoc::indoc;

#[test]
fn parse_realistic_document() {
    let root = parse(indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <!-- catalogue export -->
        <cat:catalog xmlns:cat="urn:catalog" xmlns="urn:default" version="2">
            <cat:book id="b1" lang="en">
                <title>Rust &amp; XML</title>
                <summary><![CDATA[<b>bold</b> claims]]></summary>
            </cat:book>
            <cat:book id="b2"/>
        </cat:catalog>
    "#})
    .unwrap();

    assert_eq!(root.tag, "cat:catalog");
    assert_eq!(root.local_name(), "catalog");
    assert_eq!(root.prefix(), Some("cat"));
    let names: Vec<_> = root.attrs.iter().map(|attr| attr.name.as_str()).collect();
    assert_eq!(names, ["xmlns:cat", "xmlns", "version"]);
    assert_eq!(root.get_attr("version"), Some("2"));

    let books: Vec<_> = root.child_elements().collect();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].get_attr("id"), Some("b1"));
    assert!(books[1].children.is_empty());

    let fields: Vec<_> = books[0].child_elements().collect();
    assert_eq!(fields[0].text_content(), "Rust & XML");
    assert_eq!(fields[1].text_content(), "<b>bold</b> claims");
}

#[test]
fn serialized_trees_parse_back_unchanged() {
    let tree = Element::new("note")
        .with_attr("to", "\"Ann\" & co")
        .with_text("a < b")
        .with_child(Element::new("br"))
        .with_text(" done");
    let xml = tree.to_xml();
    assert_eq!(xml, r#"<note to="&quot;Ann&quot; &amp; co">a &lt; b<br/> done</note>"#);
    assert_eq!(parse(&xml).unwrap(), tree);
}

#[test]
fn mixed_content_keeps_its_order() {
    let root = parse("<p>one <em>two</em> three</p>").unwrap();
    let kinds: Vec<_> = root
        .children
        .iter()
        .map(|content| match content {
            Content::Text(text) => text.clone(),
            Content::Element(element) => format!("<{}>", element.tag),
        })
        .collect();
    assert_eq!(kinds, ["one ", "<em>", " three"]);
}
