//! XML writer.
//!
//! Emits UTF-8 with an XML declaration, indented children, attributes in
//! the order they are stored on the element and comments immediately
//! before their owning element.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::ast::XmlElement;
use crate::error::ParseResult;

pub struct Serializer {
    indent_size: usize,
}

impl Serializer {
    pub fn new() -> Self {
        Self { indent_size: 2 }
    }

    pub fn with_indent(indent_size: usize) -> Self {
        Self { indent_size }
    }

    pub fn serialize(&self, root: &XmlElement) -> ParseResult<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', self.indent_size);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_element(&mut writer, root)?;

        let mut output = writer.into_inner();
        output.push(b'\n');
        Ok(output)
    }

    fn write_element(&self, writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> ParseResult<()> {
        if let Some(comment) = element.comment.as_deref().filter(|c| !c.trim().is_empty()) {
            // "--" may not appear inside a comment
            let comment = format!(" {} ", comment.trim().replace("--", "- -"));
            writer.write_event(Event::Comment(BytesText::from_escaped(comment)))?;
        }

        let mut start = BytesStart::new(element.tag.as_str());
        for (name, value) in &element.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        let text = element.text.as_deref().filter(|t| !t.is_empty());
        if text.is_none() && element.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &element.children {
            self.write_element(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
        Ok(())
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize with the default two-space indent.
pub fn serialize(root: &XmlElement) -> ParseResult<Vec<u8>> {
    Serializer::new().serialize(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn sample() -> XmlElement {
        XmlElement::new("plugin")
            .with_attribute("name", "Textures & Meshes")
            .with_comment("high resolution")
            .with_child(XmlElement::new("description").with_text("Adds <4K> textures"))
            .with_child(
                XmlElement::new("typeDescriptor")
                    .with_child(XmlElement::new("type").with_attribute("name", "Optional")),
            )
    }

    #[test]
    fn test_serialize_layout() {
        let output = String::from_utf8(serialize(&sample()).unwrap()).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!-- high resolution -->\n\
<plugin name=\"Textures &amp; Meshes\">\n  \
<description>Adds &lt;4K&gt; textures</description>\n  \
<typeDescriptor>\n    \
<type name=\"Optional\"/>\n  \
</typeDescriptor>\n\
</plugin>\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_written_output_parses_back() {
        let element = sample();
        let bytes = serialize(&element).unwrap();
        let doc = parse(&bytes).unwrap();

        assert_eq!(doc.comments, 1);
        assert_eq!(doc.root.attribute("name"), Some("Textures & Meshes"));
        assert_eq!(doc.root.comment.as_deref(), Some("high resolution"));
        assert_eq!(
            doc.root.child("description").and_then(|d| d.text.as_deref()),
            Some("Adds <4K> textures")
        );
    }

    #[test]
    fn test_double_dash_in_comment_is_neutralized() {
        let element = XmlElement::new("fomod").with_comment("a--b");
        let output = String::from_utf8(serialize(&element).unwrap()).unwrap();
        assert!(output.contains("<!-- a- -b -->"));
    }
}
