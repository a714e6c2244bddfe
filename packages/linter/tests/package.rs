use std::path::Path;
use std::sync::Arc;

use fomod_common::MockFileSystem;
use fomod_editor::load;
use fomod_linter::{
    check_for_errors_in, validate, Category, CheckContext, CheckRegistry, FnCheck,
    ValidationWarning,
};
use fomod_schema::Schema;

const INFO: &str = "<fomod><Name>Sample</Name><Author>Someone</Author></fomod>";

const CONFIG: &str = r#"<config>
<moduleName>Sample</moduleName>
<requiredInstallFiles>
<file source="core.esp"/>
<folder source="textures" destination="textures"/>
</requiredInstallFiles>
</config>"#;

fn package() -> MockFileSystem {
    MockFileSystem::new()
        .with_file("pkg/fomod/ModuleConfig.xml")
        .with_file("pkg/fomod/info.xml")
        .with_file("pkg/core.esp")
        .with_file("pkg/textures/rock.dds")
        .with_file("pkg/Readme.TXT")
}

fn titles(warnings: &[ValidationWarning]) -> Vec<&str> {
    warnings.iter().map(|w| w.title.as_str()).collect()
}

#[test]
fn test_validate_with_package() {
    let fs = package();
    let (doc, _) = load(Arc::new(Schema::fomod()), Some(INFO.as_bytes()), CONFIG.as_bytes()).unwrap();
    let ctx = CheckContext::new(&doc).with_package(Path::new("pkg"), &fs);

    let warnings = validate(&ctx, doc.config(), &CheckRegistry::new());
    assert_eq!(titles(&warnings), vec!["Unused Files", "Missing Destination Field"]);
    assert!(warnings[0].message.ends_with("\n    Readme.TXT"), "{}", warnings[0].message);
    assert_eq!(warnings[1].tag.as_deref(), Some("file"));
    assert_eq!(warnings[1].line, Some(4));
}

#[test]
fn test_disabled_checks_and_custom_checks() {
    let (doc, _) = load(Arc::new(Schema::fomod()), Some(INFO.as_bytes()), CONFIG.as_bytes()).unwrap();
    let ctx = CheckContext::new(&doc);

    let mut registry = CheckRegistry::new();
    assert_eq!(registry.disable("missing-destination"), 1);
    registry.add(FnCheck::new("texture-folder", Category::File, |ctx, id| {
        if ctx.doc.tag(id) == "folder" {
            vec![ValidationWarning::warning("Texture Folder", "Textures are shipped loose.")]
        } else {
            Vec::new()
        }
    }));

    let warnings = validate(&ctx, doc.config(), &registry);
    assert_eq!(titles(&warnings), vec!["Texture Folder"]);
    assert_eq!(warnings[0].line, Some(5));
}

#[test]
fn test_error_report_serializes() {
    let fs = package();
    let errors =
        check_for_errors_in(Arc::new(Schema::fomod()), INFO.as_bytes(), Some(Path::new("pkg")), &fs)
            .unwrap();
    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "line": 1,
                "title": "Versionless Installer",
                "message": "The installer has no version specified.",
                "tag": "fomod",
            },
            {
                "line": 1,
                "title": "Offline Installer",
                "message": "The installer has no website specified.",
                "tag": "fomod",
            },
        ])
    );
}
