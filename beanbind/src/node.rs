use beanbind_node::Element;

/// Read-only view of an element, as the unmarshaller walks it.
pub trait DomNode {
    /// The tag name without its namespace prefix.
    fn local_name(&self) -> &str;

    /// Attributes as `(qualified name, value)` pairs, in document order.
    fn attributes(&self) -> impl Iterator<Item = (&str, &str)>;

    /// Child elements in document order.
    fn child_elements(&self) -> impl Iterator<Item = &Self>;

    /// All descendant text, concatenated.
    fn text_content(&self) -> String;
}

impl DomNode for Element {
    fn local_name(&self) -> &str {
        Element::local_name(self)
    }

    fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs
            .iter()
            .map(|attr| (attr.name.as_str(), attr.value.as_str()))
    }

    fn child_elements(&self) -> impl Iterator<Item = &Self> {
        Element::child_elements(self)
    }

    fn text_content(&self) -> String {
        Element::text_content(self)
    }
}

/// `xmlns` and `xmlns:*` attributes carry no bean data.
pub(crate) fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn namespace_declarations() {
        assert!(is_namespace_declaration("xmlns"));
        assert!(is_namespace_declaration("xmlns:xsi"));
        assert!(!is_namespace_declaration("xmlnsish"));
        assert!(!is_namespace_declaration("id"));
    }

    #[test]
    fn elements_expose_attribute_pairs() {
        let element = Element::new("e").with_attr("xmlns:a", "urn:a").with_attr("id", "7");
        let pairs: Vec<_> = DomNode::attributes(&element).collect();
        assert_eq!(pairs, [("xmlns:a", "urn:a"), ("id", "7")]);
        assert_eq!(DomNode::local_name(&element), "e");
    }
}
