//! Option types and conditional file installs.

use fomod_editor::{Document, NodeId};
use serde::{Deserialize, Serialize};

use crate::conditions::{Conditions, EvalContext};
use crate::enums::OptionType;
use crate::files::Files;

/// An option type that depends on conditions. The first pattern whose
/// conditions hold wins, otherwise `default` applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub default: OptionType,
    pub patterns: Vec<(Conditions, OptionType)>,
}

impl Type {
    /// Read a `dependencyType` node.
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        let default = doc
            .find_child(id, "defaultType")
            .map(|node| OptionType::parse_or_default(doc.attribute(node, "name")))
            .unwrap_or_default();

        let patterns = doc
            .find_child(id, "patterns")
            .map(|patterns| doc.find_children(patterns, "pattern"))
            .unwrap_or_default()
            .into_iter()
            .map(|pattern| {
                let conditions = doc
                    .find_child(pattern, "dependencies")
                    .map(|node| Conditions::from_node(doc, node))
                    .unwrap_or_default();
                let option_type = doc
                    .find_child(pattern, "type")
                    .map(|node| OptionType::parse_or_default(doc.attribute(node, "name")))
                    .unwrap_or_default();
                (conditions, option_type)
            })
            .collect();

        Self { default, patterns }
    }

    pub fn resolve(&self, ctx: &EvalContext<'_>) -> OptionType {
        self.patterns
            .iter()
            .find(|(conditions, _)| conditions.evaluate(ctx))
            .map(|(_, option_type)| *option_type)
            .unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDescriptor {
    Fixed(OptionType),
    Conditional(Type),
}

impl Default for TypeDescriptor {
    fn default() -> Self {
        TypeDescriptor::Fixed(OptionType::default())
    }
}

impl TypeDescriptor {
    /// Read a `typeDescriptor` node.
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        if let Some(fixed) = doc.find_child(id, "type") {
            return TypeDescriptor::Fixed(OptionType::parse_or_default(doc.attribute(fixed, "name")));
        }
        match doc.find_child(id, "dependencyType") {
            Some(conditional) => TypeDescriptor::Conditional(Type::from_node(doc, conditional)),
            None => TypeDescriptor::default(),
        }
    }

    pub fn resolve(&self, ctx: &EvalContext<'_>) -> OptionType {
        match self {
            TypeDescriptor::Fixed(option_type) => *option_type,
            TypeDescriptor::Conditional(conditional) => conditional.resolve(ctx),
        }
    }

    /// Every value the option can resolve to, default first.
    pub fn possible_types(&self) -> Vec<OptionType> {
        match self {
            TypeDescriptor::Fixed(fixed) => vec![*fixed],
            TypeDescriptor::Conditional(conditional) => std::iter::once(conditional.default)
                .chain(conditional.patterns.iter().map(|(_, t)| *t))
                .collect(),
        }
    }

    /// Could the option ever resolve to `option_type`?
    pub fn can_be(&self, option_type: OptionType) -> bool {
        self.possible_types().contains(&option_type)
    }

    /// Does the option resolve to `option_type` whatever the conditions?
    pub fn always(&self, option_type: OptionType) -> bool {
        self.possible_types().iter().all(|t| *t == option_type)
    }
}

/// Files installed after the last page when their conditions hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilePatterns {
    pub patterns: Vec<(Conditions, Files)>,
}

impl FilePatterns {
    /// Read a `conditionalFileInstalls` node.
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        let patterns = doc
            .find_child(id, "patterns")
            .map(|patterns| doc.find_children(patterns, "pattern"))
            .unwrap_or_default()
            .into_iter()
            .map(|pattern| {
                let conditions = doc
                    .find_child(pattern, "dependencies")
                    .map(|node| Conditions::from_node(doc, node))
                    .unwrap_or_default();
                let files = doc
                    .find_child(pattern, "files")
                    .map(|node| Files::from_node(doc, node))
                    .unwrap_or_default();
                (conditions, files)
            })
            .collect();
        Self { patterns }
    }

    /// Files of every satisfied pattern, merged in pattern order.
    pub fn satisfied(&self, ctx: &EvalContext<'_>) -> Files {
        let mut files = Files::new();
        for (conditions, pattern_files) in &self.patterns {
            if conditions.evaluate(ctx) {
                files.merge(pattern_files);
            }
        }
        files
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::Condition;
    use crate::enums::ConditionType;
    use crate::flags::Flags;

    fn when(flag: &str, value: &str) -> Conditions {
        Conditions::new(ConditionType::And).with(Condition::Flag {
            name: flag.to_string(),
            value: value.to_string(),
        })
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let conditional = Type {
            default: OptionType::Optional,
            patterns: vec![
                (when("hd", "on"), OptionType::Recommended),
                (when("hd", "on"), OptionType::NotUsable),
            ],
        };
        let descriptor = TypeDescriptor::Conditional(conditional);

        let flags = Flags::new();
        assert_eq!(descriptor.resolve(&EvalContext::new(&flags)), OptionType::Optional);

        let flags: Flags = [("hd", "on")].into_iter().collect();
        assert_eq!(descriptor.resolve(&EvalContext::new(&flags)), OptionType::Recommended);

        assert!(descriptor.can_be(OptionType::NotUsable));
        assert!(!descriptor.can_be(OptionType::Required));
        assert!(!descriptor.always(OptionType::Optional));
    }

    #[test]
    fn test_always_needs_every_branch() {
        let fixed = TypeDescriptor::Fixed(OptionType::Required);
        assert!(fixed.always(OptionType::Required));
        assert_eq!(fixed.possible_types(), vec![OptionType::Required]);

        let unlockable = TypeDescriptor::Conditional(Type {
            default: OptionType::NotUsable,
            patterns: vec![(when("hd", "on"), OptionType::Optional)],
        });
        assert!(unlockable.can_be(OptionType::NotUsable));
        assert!(!unlockable.always(OptionType::NotUsable));

        let locked = TypeDescriptor::Conditional(Type {
            default: OptionType::Required,
            patterns: vec![(when("hd", "on"), OptionType::Required)],
        });
        assert!(locked.always(OptionType::Required));
        assert_eq!(locked.possible_types(), vec![OptionType::Required, OptionType::Required]);
    }

    #[test]
    fn test_satisfied_patterns_merge_in_order() {
        let patterns = FilePatterns {
            patterns: vec![
                (when("a", "1"), [("x", "first")].into_iter().collect()),
                (when("b", "1"), [("y", "never")].into_iter().collect()),
                (Conditions::default(), [("x", "second")].into_iter().collect()),
            ],
        };
        let flags: Flags = [("a", "1")].into_iter().collect();
        let files = patterns.satisfied(&EvalContext::new(&flags));
        let pairs: Vec<(&str, &str)> = files.iter().collect();
        assert_eq!(pairs, vec![("x", "second")]);
    }
}
