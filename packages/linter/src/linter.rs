use fomod_editor::{Document, NodeId, ValidationWarning};
use tracing::{debug, instrument};

use crate::checks::{Category, CheckRegistry};
use crate::context::CheckContext;

/// Run every registered check on `node` and its descendants.
///
/// Warnings come out in pre-order, and in registration order for a
/// single node.
#[instrument(skip_all, fields(node = %node))]
pub fn validate(
    ctx: &CheckContext<'_>,
    node: NodeId,
    registry: &CheckRegistry,
) -> Vec<ValidationWarning> {
    let doc = ctx.doc;
    let mut warnings = Vec::new();

    for id in doc.descendants(node) {
        let category = match Category::of(doc, id) {
            Some(category) => category,
            None => continue,
        };
        for check in registry.checks(category) {
            let found = check.check(ctx, id);
            if !found.is_empty() {
                debug!(check = check.name(), node = %id, count = found.len(), "check fired");
            }
            warnings.extend(found.into_iter().map(|warning| warning.at(doc, id)));
        }
    }
    warnings
}

/// Validate both trees of `doc` with the built-in checks.
pub fn validate_document(doc: &Document) -> Vec<ValidationWarning> {
    let ctx = CheckContext::new(doc);
    let registry = CheckRegistry::new();
    let mut warnings = validate(&ctx, doc.info(), &registry);
    warnings.extend(validate(&ctx, doc.config(), &registry));
    warnings
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fomod_editor::{load, new_document};
    use fomod_schema::Schema;

    use super::*;
    use crate::checks::FnCheck;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::fomod())
    }

    fn titles(warnings: &[ValidationWarning]) -> Vec<&str> {
        warnings.iter().map(|w| w.title.as_str()).collect()
    }

    #[test]
    fn test_new_document() {
        let doc = new_document(schema()).unwrap();
        let warnings = validate_document(&doc);
        assert_eq!(titles(&warnings), vec!["Empty Fomod Tree", "Missing Installer Name"]);
        assert_eq!(warnings[0].tag.as_deref(), Some("config"));
        assert!(warnings.iter().all(|w| !w.is_critical()));
    }

    const GROUPS: &str = r#"<config>
  <moduleName>Groups</moduleName>
  <installSteps order="Explicit">
    <installStep name="Main">
      <optionalFileGroups order="Explicit">
        <group name="Exclusive" type="SelectExactlyOne">
          <plugins order="Explicit">
            <plugin name="A"><description>a</description><conditionFlags><flag name="a">on</flag></conditionFlags><typeDescriptor><type name="Required"/></typeDescriptor></plugin>
            <plugin name="B"><description>b</description><conditionFlags><flag name="b">on</flag></conditionFlags><typeDescriptor><type name="Required"/></typeDescriptor></plugin>
          </plugins>
        </group>
        <group name="Locked" type="SelectAtLeastOne">
          <plugins order="Explicit">
            <plugin name="C"><description>c</description><conditionFlags><flag name="c">on</flag></conditionFlags><typeDescriptor><type name="NotUsable"/></typeDescriptor></plugin>
          </plugins>
        </group>
      </optionalFileGroups>
    </installStep>
  </installSteps>
  <conditionalFileInstalls>
    <patterns>
      <pattern>
        <dependencies><flagDependency flag="d" value="on"/></dependencies>
        <files><file source="d.esp" destination="d.esp"/></files>
      </pattern>
    </patterns>
  </conditionalFileInstalls>
</config>"#;

    #[test]
    fn test_group_policies_and_flags() {
        let (doc, _) = load(schema(), Some(b"<fomod/>".as_slice()), GROUPS.as_bytes()).unwrap();
        let warnings = validate(&CheckContext::new(&doc), doc.config(), &CheckRegistry::new());
        assert_eq!(
            titles(&warnings),
            vec!["Too Many Required Options", "Not Enough Selectable Options", "Impossible Flag"]
        );
        assert_eq!(warnings[0].tag.as_deref(), Some("group"));
        assert_eq!(warnings[2].message, "The flag 'd' is never created or set.");
        assert!(warnings.iter().all(ValidationWarning::is_critical));
    }

    fn conditional_plugin(name: &str, default: &str, when_hd: &str) -> String {
        format!(
            r#"<plugin name="{name}"><description>{name}</description>
              <conditionFlags><flag name="hd">on</flag></conditionFlags>
              <typeDescriptor><dependencyType><defaultType name="{default}"/><patterns>
                <pattern><dependencies><flagDependency flag="hd" value="on"/></dependencies><type name="{when_hd}"/></pattern>
              </patterns></dependencyType></typeDescriptor>
            </plugin>"#
        )
    }

    fn single_group(policy: &str, plugins: &[String]) -> String {
        format!(
            r#"<config><moduleName>Conditional</moduleName><installSteps order="Explicit">
              <installStep name="Main"><optionalFileGroups order="Explicit">
                <group name="G" type="{policy}"><plugins order="Explicit">{}</plugins></group>
              </optionalFileGroups></installStep></installSteps></config>"#,
            plugins.concat()
        )
    }

    fn policy_warnings(config: &str) -> Vec<(String, bool)> {
        let (doc, _) = load(schema(), Some(b"<fomod/>".as_slice()), config.as_bytes()).unwrap();
        validate(&CheckContext::new(&doc), doc.config(), &CheckRegistry::new())
            .into_iter()
            .filter(|w| w.tag.as_deref() == Some("group"))
            .map(|w| {
                let critical = w.is_critical();
                (w.title, critical)
            })
            .collect()
    }

    #[test]
    fn test_unlockable_option_counts_as_selectable() {
        let config = single_group(
            "SelectAtLeastOne",
            &[conditional_plugin("Unlockable", "NotUsable", "Optional")],
        );
        assert!(policy_warnings(&config).is_empty());

        let locked = single_group(
            "SelectAtLeastOne",
            &[conditional_plugin("Locked", "NotUsable", "NotUsable")],
        );
        assert_eq!(
            policy_warnings(&locked),
            vec![("Not Enough Selectable Options".to_string(), true)]
        );
    }

    #[test]
    fn test_conditionally_required_options_are_not_too_many() {
        let config = single_group(
            "SelectAtMostOne",
            &[
                conditional_plugin("A", "Optional", "Required"),
                conditional_plugin("B", "Optional", "Required"),
            ],
        );
        assert!(policy_warnings(&config).is_empty());

        let always = single_group(
            "SelectAtMostOne",
            &[
                conditional_plugin("A", "Required", "Required"),
                conditional_plugin("B", "Required", "Required"),
            ],
        );
        assert_eq!(
            policy_warnings(&always),
            vec![("Too Many Required Options".to_string(), true)]
        );
    }

    /// The FOMOD schema with condition blocks allowed to be empty.
    fn lenient_schema() -> Arc<Schema> {
        let mut json: serde_json::Value =
            serde_json::from_str(&Schema::fomod().to_json().unwrap()).unwrap();
        json["types"]["compositeDependency"]["content"]["min_occurs"] = 0.into();
        Arc::new(Schema::from_json(&json.to_string()).unwrap())
    }

    #[test]
    fn test_empty_conditions_fire_for_either_operator() {
        for operator in ["And", "Or"] {
            let config = format!(
                r#"<config><moduleName>M</moduleName><moduleDependencies operator="{operator}"/></config>"#
            );
            let (doc, _) =
                load(lenient_schema(), Some(b"<fomod/>".as_slice()), config.as_bytes()).unwrap();
            let warnings = validate(&CheckContext::new(&doc), doc.config(), &CheckRegistry::new());
            let empty: Vec<&ValidationWarning> =
                warnings.iter().filter(|w| w.title == "Empty Conditions").collect();
            assert_eq!(empty.len(), 1, "operator {}", operator);
            assert_eq!(empty[0].tag.as_deref(), Some("moduleDependencies"));
            assert!(!empty[0].is_critical());
        }
    }

    #[test]
    fn test_custom_checks_extend_or_replace() {
        let (doc, _) = load(schema(), Some(b"<fomod/>".as_slice()), GROUPS.as_bytes()).unwrap();
        let ctx = CheckContext::new(&doc);

        let mut registry = CheckRegistry::new();
        registry.add(FnCheck::new("shout", Category::Option, |ctx, id| {
            vec![ValidationWarning::warning(
                "Seen",
                ctx.doc.attribute(id, "name").unwrap_or_default().to_string(),
            )]
        }));
        registry.replace(FnCheck::new("group-policy", Category::Group, |_, _| Vec::new()));

        let warnings = validate(&ctx, doc.config(), &registry);
        assert_eq!(titles(&warnings), vec!["Seen", "Seen", "Seen", "Impossible Flag"]);
        let names: Vec<&str> = warnings.iter().take(3).map(|w| w.message.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_output_is_deterministic() {
        let (doc, _) = load(schema(), None, GROUPS.as_bytes()).unwrap();
        let first = validate_document(&doc);
        let second = validate_document(&doc);
        assert_eq!(first, second);
    }
}
