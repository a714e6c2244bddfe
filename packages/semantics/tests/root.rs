use std::sync::Arc;

use fomod_editor::new_document;
use fomod_schema::Schema;
use fomod_semantics::{EvalContext, Files, Flags, GroupType, Order, Root, TypeDescriptor};

#[test]
fn test_new_document_is_empty() {
    let doc = new_document(Arc::new(Schema::fomod())).unwrap();
    let root = Root::from_document(&doc);
    assert!(root.is_empty());
    assert_eq!(root.name, "");
    assert!(root.conditions.is_none());
    assert_eq!(root.page_order, Order::Ascending);
}

#[test]
fn test_views_follow_edits() {
    let mut doc = new_document(Arc::new(Schema::fomod())).unwrap();
    let config = doc.config();
    let steps = doc.add_child(config, "installSteps").unwrap();
    let step = doc.children(steps).unwrap()[0];
    doc.set_attribute(step, "name", "Main").unwrap();

    let group = doc
        .descendants(step)
        .into_iter()
        .find(|id| doc.tag(*id) == "group")
        .unwrap();
    doc.set_attribute(group, "type", "SelectExactlyOne").unwrap();

    let root = Root::from_document(&doc);
    assert_eq!(root.pages.len(), 1);
    assert_eq!(root.pages[0].name, "Main");
    let group = &root.pages[0].groups[0];
    assert_eq!(group.policy, GroupType::SelectExactlyOne);
    assert_eq!(group.options.len(), 1);
    assert!(matches!(group.options[0].type_descriptor, TypeDescriptor::Fixed(_)));
    assert_eq!(group.options[0].files, Files::new());

    let flags = Flags::new();
    assert!(root.pages[0].is_visible(&EvalContext::new(&flags)));
}
