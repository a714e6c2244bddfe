//! Building documents from untrusted bytes.
//!
//! Schema violations in the input are never raised. Each one is corrected
//! in the tree and reported as a critical [`ValidationWarning`], so writing
//! the document back out produces a valid file.

use std::sync::{Arc, OnceLock};

use fomod_parser::{parse, XmlElement};
use fomod_schema::{AttributeDef, ElementDef, Schema, CONFIG_ROOT, INFO_ROOT};
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::attributes::{coerce, AttributeValue};
use crate::document::Document;
use crate::errors::EditorError;
use crate::mutations::MutationError;
use crate::node::NodeId;
use crate::warnings::ValidationWarning;

/// Load an installer from its metadata (optional) and configuration documents.
#[instrument(skip_all, fields(has_info = info.is_some()))]
pub fn load(
    schema: Arc<Schema>,
    info: Option<&[u8]>,
    config: &[u8],
) -> Result<(Document, Vec<ValidationWarning>), EditorError> {
    let config_xml = parse(config)?;
    expect_root(&config_xml.root, CONFIG_ROOT)?;
    let info_xml = info.map(parse).transpose()?;
    if let Some(xml) = &info_xml {
        expect_root(&xml.root, INFO_ROOT)?;
    }

    let mut doc = Document::with_roots(schema)?;
    let mut warnings = Vec::new();

    let comments = config_xml.comments + info_xml.as_ref().map_or(0, |xml| xml.comments);
    if comments > 0 {
        warnings.push(comments_present());
    }

    let (info_root, config_root) = (doc.info(), doc.config());
    match &info_xml {
        Some(xml) => Builder::new(&mut doc, &mut warnings).fill(info_root, &xml.root)?,
        None => {
            warnings.push(ValidationWarning::warning(
                "Missing Info XML",
                "Info.xml is missing from the fomod subfolder.",
            ));
            doc.complete(info_root)?;
        }
    }
    Builder::new(&mut doc, &mut warnings).fill(config_root, &config_xml.root)?;

    info!(warnings = warnings.len(), "loaded installer");
    Ok((doc, warnings))
}

/// Load a single document, metadata or configuration, detected by its root
/// tag. The other tree is left empty. Returns the loaded root.
#[instrument(skip_all)]
pub fn load_document(
    schema: Arc<Schema>,
    bytes: &[u8],
) -> Result<(Document, NodeId, Vec<ValidationWarning>), EditorError> {
    let xml = parse(bytes)?;
    let mut doc = Document::with_roots(schema)?;
    let (root, other) = match xml.root.tag.as_str() {
        CONFIG_ROOT => (doc.config(), doc.info()),
        INFO_ROOT => (doc.info(), doc.config()),
        found => {
            return Err(EditorError::UnexpectedRoot {
                expected: format!("{} or {}", CONFIG_ROOT, INFO_ROOT),
                found: found.to_string(),
            })
        }
    };

    let mut warnings = Vec::new();
    if xml.comments > 0 {
        warnings.push(comments_present());
    }
    Builder::new(&mut doc, &mut warnings).fill(root, &xml.root)?;
    doc.complete(other)?;
    Ok((doc, root, warnings))
}

fn expect_root(root: &XmlElement, expected: &str) -> Result<(), EditorError> {
    if root.tag == expected {
        Ok(())
    } else {
        Err(EditorError::UnexpectedRoot {
            expected: expected.to_string(),
            found: root.tag.clone(),
        })
    }
}

fn comments_present() -> ValidationWarning {
    ValidationWarning::critical(
        "XML Comments Present",
        "There are comments in the fomod, they will be ignored.",
    )
}

fn is_namespace_attribute(name: &str) -> bool {
    name.starts_with("xmlns") || name.starts_with("xsi:")
}

/// "GroupType" -> "Group Type"
fn split_words(name: &str) -> String {
    static WORDS: OnceLock<Option<Regex>> = OnceLock::new();
    match WORDS.get_or_init(|| Regex::new(r"[A-Z]?[a-z]+|[A-Z]+").ok()) {
        Some(words) => words
            .find_iter(name)
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        None => name.to_string(),
    }
}

/// "MachineVersion" -> "Machineversion", like a title-cased word
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn invalid_value(tag: &str, def: &AttributeDef, actual: &str, fallback: &str) -> ValidationWarning {
    match &def.enumeration {
        Some(enumeration) => {
            let name = split_words(&enumeration.name);
            ValidationWarning::critical(
                format!("Invalid {}", name),
                format!(
                    "{} was set to '{}' in tag '{}' but can only be one of: '{}'. \
                     It was set to default '{}'.",
                    name,
                    actual,
                    tag,
                    enumeration.values.join("', '"),
                    fallback
                ),
            )
        }
        None => ValidationWarning::critical(
            "Invalid Attribute Value",
            format!(
                "The '{}' attribute on the '{}' tag must be {} but was '{}'. \
                 It was set to '{}'.",
                def.name,
                tag,
                def.value_type.name(),
                actual,
                fallback
            ),
        ),
    }
}

struct Builder<'a> {
    doc: &'a mut Document,
    warnings: &'a mut Vec<ValidationWarning>,
}

impl<'a> Builder<'a> {
    fn new(doc: &'a mut Document, warnings: &'a mut Vec<ValidationWarning>) -> Self {
        Self { doc, warnings }
    }

    fn report(&mut self, warning: ValidationWarning) {
        warn!(
            title = %warning.title,
            tag = warning.tag.as_deref().unwrap_or(""),
            line = warning.line.unwrap_or(0),
            "corrected document"
        );
        self.warnings.push(warning);
    }

    /// Populate `id` from `xml`.
    fn fill(&mut self, id: NodeId, xml: &XmlElement) -> Result<(), MutationError> {
        if xml.line > 0 {
            self.doc.node_mut(id).line = Some(xml.line);
        }
        self.attributes(id, xml)?;
        self.text(id, xml)?;
        self.children(id, xml)
    }

    fn attributes(&mut self, id: NodeId, xml: &XmlElement) -> Result<(), MutationError> {
        let schema = self.doc.shared_schema();
        let kind = self.doc.kind(id).to_string();

        for (name, value) in &xml.attributes {
            if is_namespace_attribute(name) {
                continue;
            }
            let def = match schema.attribute(&kind, name) {
                Ok(def) => def,
                Err(_) => {
                    let warning = ValidationWarning::critical(
                        "Unknown Attribute",
                        format!(
                            "The '{}' attribute is not allowed on the '{}' tag. It was removed.",
                            name, xml.tag
                        ),
                    )
                    .at(self.doc, id);
                    self.report(warning);
                    continue;
                }
            };

            match coerce(def, &AttributeValue::Str(value.clone())) {
                Ok(typed) => {
                    self.doc
                        .node_mut(id)
                        .attributes
                        .insert(name.clone(), typed.to_string());
                }
                Err(_) => {
                    let fallback = def.fallback_value();
                    // Optional attributes fall back by being absent.
                    if def.required {
                        self.doc
                            .node_mut(id)
                            .attributes
                            .insert(name.clone(), fallback.clone());
                    }
                    let warning = invalid_value(&xml.tag, def, value, &fallback).at(self.doc, id);
                    self.report(warning);
                }
            }
        }

        for (name, value) in self.doc.fill_required_attributes(id)? {
            let warning = ValidationWarning::critical(
                format!("Missing {} Attribute", title_case(&name)),
                format!(
                    "The '{}' attribute on the '{}' tag is required. It was set to '{}'.",
                    name, xml.tag, value
                ),
            )
            .at(self.doc, id);
            self.report(warning);
        }
        Ok(())
    }

    fn text(&mut self, id: NodeId, xml: &XmlElement) -> Result<(), MutationError> {
        let holds_text = self.doc.schema().element_type(self.doc.kind(id))?.is_some();
        match &xml.text {
            Some(text) if holds_text => self.doc.node_mut(id).text = Some(text.clone()),
            Some(text) if !text.trim().is_empty() => {
                let warning = ValidationWarning::critical(
                    "Unexpected Text",
                    format!("The '{}' tag cannot contain text. It was removed.", xml.tag),
                )
                .at(self.doc, id);
                self.report(warning);
            }
            _ => {}
        }
        Ok(())
    }

    fn children(&mut self, id: NodeId, xml: &XmlElement) -> Result<(), MutationError> {
        let schema = self.doc.shared_schema();
        let content = schema.valid_children(self.doc.kind(id))?;

        let mut known: Vec<(&XmlElement, &ElementDef)> = Vec::new();
        for child in &xml.children {
            match content.element(&child.tag) {
                Some(def) => known.push((child, def)),
                None => self.report(
                    ValidationWarning::critical(
                        "Unknown Element",
                        format!(
                            "The '{}' tag is not allowed inside '{}'. It was removed.",
                            child.tag, xml.tag
                        ),
                    )
                    .with_location(&child.tag, child.line),
                ),
            }
        }

        let tags: Vec<&str> = known.iter().map(|(child, _)| child.tag.as_str()).collect();
        if !content.accepts_partial(&tags) {
            known.sort_by_key(|(child, _)| content.slot_of(&child.tag));
            let sorted: Vec<&str> = known.iter().map(|(child, _)| child.tag.as_str()).collect();
            if sorted != tags {
                let warning = ValidationWarning::critical(
                    "Unordered Elements",
                    format!(
                        "The children of the '{}' tag were out of order. They were reordered.",
                        xml.tag
                    ),
                )
                .at(self.doc, id);
                self.report(warning);
            }
        }

        // Only check child by child when the whole list does not fit.
        let ordered: Vec<&str> = known.iter().map(|(child, _)| child.tag.as_str()).collect();
        let fits = content.accepts_partial(&ordered);
        let mut kept: Vec<&str> = Vec::new();
        for (child_xml, def) in known {
            kept.push(&child_xml.tag);
            if !fits && !content.accepts_partial(&kept) {
                kept.pop();
                self.report(
                    ValidationWarning::critical(
                        "Surplus Element",
                        format!(
                            "The '{}' tag appears more often than allowed inside '{}'. \
                             It was removed.",
                            child_xml.tag, xml.tag
                        ),
                    )
                    .with_location(&child_xml.tag, child_xml.line),
                );
                continue;
            }

            let child = self.doc.create(&child_xml.tag, &def.type_name);
            let index = self.doc.node(id).children.len();
            self.doc.attach(id, child, index);
            self.fill(child, child_xml)?;
        }

        for added in self.doc.complete_children(id)? {
            let warning = ValidationWarning::critical(
                "Missing Element",
                format!(
                    "The '{}' tag requires a '{}' child. It was added.",
                    xml.tag,
                    self.doc.tag(added)
                ),
            )
            .at(self.doc, id);
            self.report(warning);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::Severity;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::fomod())
    }

    fn titles(warnings: &[ValidationWarning]) -> Vec<&str> {
        warnings.iter().map(|w| w.title.as_str()).collect()
    }

    const VALID: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<config xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="http://qconsulting.ca/fo3/ModConfig5.0.xsd">
    <moduleName>Example</moduleName>
    <requiredInstallFiles>
        <folder source="core" destination=""/>
    </requiredInstallFiles>
</config>"#;

    #[test]
    fn test_valid_config_loads_cleanly() {
        let info = b"<fomod><Name>Example</Name></fomod>";
        let (doc, warnings) = load(schema(), Some(info.as_slice()), VALID.as_bytes()).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);

        let name = doc.find_child(doc.config(), "moduleName").unwrap();
        assert_eq!(doc.text(name), Some("Example"));
        assert_eq!(doc.line(name), Some(3));
    }

    #[test]
    fn test_missing_info_is_not_critical() {
        let (doc, warnings) = load(schema(), None, VALID.as_bytes()).unwrap();
        assert_eq!(titles(&warnings), vec!["Missing Info XML"]);
        assert_eq!(warnings[0].severity, Severity::Warning);
        assert!(doc.children(doc.info()).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_root_is_an_error() {
        let err = load(schema(), None, b"<fomod/>").unwrap_err();
        assert!(matches!(err, EditorError::UnexpectedRoot { .. }));
        let err = load(schema(), None, b"<config>").unwrap_err();
        assert!(matches!(err, EditorError::Parse(_)));
    }

    #[test]
    fn test_invalid_enum_is_reset() {
        let source = r#"<config><moduleName/><installSteps order="Sideways"><installStep name="A"><optionalFileGroups><group name="G" type="SelectSome"><plugins><plugin name="P"><description/><typeDescriptor><type name="Optional"/></typeDescriptor></plugin></plugins></group></optionalFileGroups></installStep></installSteps></config>"#;
        let (doc, warnings) = load(schema(), Some(b"<fomod/>".as_slice()), source.as_bytes()).unwrap();

        assert_eq!(titles(&warnings), vec!["Invalid Order", "Invalid Group Type"]);
        assert_eq!(
            warnings[1].message,
            "Group Type was set to 'SelectSome' in tag 'group' but can only be one of: \
             'SelectAny', 'SelectAll', 'SelectAtLeastOne', 'SelectAtMostOne', 'SelectExactlyOne'. \
             It was set to default 'SelectAny'."
        );
        assert!(warnings.iter().all(ValidationWarning::is_critical));

        let steps = doc.find_child(doc.config(), "installSteps").unwrap();
        assert!(!doc.has_attribute(steps, "order"));
        let group = doc
            .descendants(steps)
            .into_iter()
            .find(|id| doc.tag(*id) == "group")
            .unwrap();
        assert_eq!(doc.attribute(group, "type"), Some("SelectAny"));
    }

    #[test]
    fn test_structure_is_corrected() {
        let source = r#"<config>
  <!-- reordered -->
  <requiredInstallFiles><file source="a" bogus="1"/></requiredInstallFiles>
  <moduleName>Mod</moduleName>
  <moduleName>Again</moduleName>
  <extra/>
  <moduleImage/>
</config>"#;
        let (doc, warnings) = load(schema(), Some(b"<fomod/>".as_slice()), source.as_bytes()).unwrap();

        assert_eq!(
            titles(&warnings),
            vec![
                "XML Comments Present",
                "Unknown Element",
                "Unordered Elements",
                "Surplus Element",
                "Missing Path Attribute",
                "Unknown Attribute",
            ]
        );
        let children: Vec<&str> = doc
            .children(doc.config())
            .unwrap()
            .iter()
            .map(|id| doc.tag(*id))
            .collect();
        assert_eq!(children, vec!["moduleName", "moduleImage", "requiredInstallFiles"]);
        assert_eq!(warnings[3].line, Some(5));
    }

    #[test]
    fn test_missing_required_element_is_added() {
        let source = r#"<config><moduleName/><installSteps/></config>"#;
        let (doc, warnings) = load(schema(), Some(b"<fomod/>".as_slice()), source.as_bytes()).unwrap();
        assert_eq!(titles(&warnings), vec!["Missing Element"]);
        let steps = doc.find_child(doc.config(), "installSteps").unwrap();
        assert_eq!(doc.find_children(steps, "installStep").len(), 1);
    }

    #[test]
    fn test_load_document_detects_root() {
        let (doc, root, warnings) =
            load_document(schema(), b"<fomod><Author>Me</Author></fomod>").unwrap();
        assert_eq!(root, doc.info());
        assert!(warnings.is_empty());
        assert_eq!(doc.tag(doc.children(doc.config()).unwrap()[0]), "moduleName");
    }

    #[test]
    fn test_word_helpers() {
        assert_eq!(split_words("GroupType"), "Group Type");
        assert_eq!(split_words("Order"), "Order");
        assert_eq!(title_case("MachineVersion"), "Machineversion");
    }
}
