//! Writing documents back to bytes.

use fomod_parser::{serialize, XmlElement};

use crate::document::Document;
use crate::errors::EditorError;
use crate::node::NodeId;

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str = "http://qconsulting.ca/fo3/ModConfig5.0.xsd";

/// Serialize both trees. Returns `(metadata, configuration)`.
pub fn save(doc: &Document) -> Result<(Vec<u8>, Vec<u8>), EditorError> {
    let info = serialize(&to_xml(doc, doc.info()))?;

    let mut config = to_xml(doc, doc.config());
    let namespace = [
        ("xmlns:xsi".to_string(), XSI_NAMESPACE.to_string()),
        (
            "xsi:noNamespaceSchemaLocation".to_string(),
            SCHEMA_LOCATION.to_string(),
        ),
    ];
    config.attributes = namespace.into_iter().chain(config.attributes).collect();
    let config = serialize(&config)?;
    Ok((info, config))
}

/// Raw element tree for `id`, attributes in declaration order.
pub fn to_xml(doc: &Document, id: NodeId) -> XmlElement {
    let node = doc.node(id);
    let mut element = XmlElement::new(node.tag.clone());

    match doc.schema().valid_attributes(&node.kind) {
        Ok(defs) => {
            for def in defs {
                if let Some(value) = node.attributes.get(&def.name) {
                    element.attributes.push((def.name.clone(), value.clone()));
                }
            }
        }
        Err(_) => element
            .attributes
            .extend(node.attributes.iter().map(|(k, v)| (k.clone(), v.clone()))),
    }

    element.text = node.text.clone();
    element.comment = node.comment.clone();
    element.children = node.children.iter().map(|child| to_xml(doc, *child)).collect();
    element
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fomod_schema::Schema;

    use super::*;

    #[test]
    fn test_new_document_output() {
        let doc = Document::new(Arc::new(Schema::fomod())).unwrap();
        let (info, config) = save(&doc).unwrap();

        assert_eq!(
            String::from_utf8(info).unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<fomod/>\n"
        );
        assert_eq!(
            String::from_utf8(config).unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<config xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
xsi:noNamespaceSchemaLocation=\"http://qconsulting.ca/fo3/ModConfig5.0.xsd\">\n  \
<moduleName/>\n\
</config>\n"
        );
    }

    #[test]
    fn test_attributes_follow_declaration_order() {
        let mut doc = Document::new(Arc::new(Schema::fomod())).unwrap();
        let config = doc.config();
        let image = doc.add_child(config, "moduleImage").unwrap();
        doc.set_attribute(image, "height", 120).unwrap();
        doc.set_attribute(image, "showImage", false).unwrap();
        doc.set_attribute(image, "path", "fomod/header.png").unwrap();
        doc.set_comment(image, "banner");

        let element = to_xml(&doc, image);
        let names: Vec<&str> = element.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["path", "showImage", "height"]);
        assert_eq!(element.comment.as_deref(), Some("banner"));
    }
}
