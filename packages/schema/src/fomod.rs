//! The built-in FOMOD schema: ModuleConfig 5.0 (`config`) and the
//! installer metadata document (`fomod`).

use crate::model::{
    AttributeDef, ComplexType, ElementDef, Enumeration, MaxOccurs, OrderIndicator, Schema,
    ValueType,
};

pub const CONFIG_ROOT: &str = "config";
pub const INFO_ROOT: &str = "fomod";

const ORDER: &[&str] = &["Ascending", "Descending", "Explicit"];
const CONDITION_TYPE: &[&str] = &["And", "Or"];
const FILE_TYPE: &[&str] = &["Active", "Inactive", "Missing"];
const GROUP_TYPE: &[&str] = &[
    "SelectAny",
    "SelectAll",
    "SelectAtLeastOne",
    "SelectAtMostOne",
    "SelectExactlyOne",
];
const OPTION_TYPE: &[&str] = &[
    "Optional",
    "Required",
    "Recommended",
    "NotUsable",
    "CouldBeUsable",
];
const POSITION: &[&str] = &["Left", "Right", "RightOfImage"];

fn string_attr(name: &str) -> AttributeDef {
    AttributeDef::new(name, ValueType::String)
}

fn order_attr() -> AttributeDef {
    string_attr("order")
        .with_enumeration(Enumeration::new("Order", ORDER))
        .with_default("Ascending")
        .with_doc("How children are ordered when presented to the user.")
}

fn text_type(name: &str) -> ComplexType {
    ComplexType::new(name).text(ValueType::String)
}

fn sequence(particles: Vec<ElementDef>) -> OrderIndicator {
    OrderIndicator::sequence(particles.into_iter().map(Into::into).collect())
}

fn choice(particles: Vec<ElementDef>) -> OrderIndicator {
    OrderIndicator::choice(particles.into_iter().map(Into::into).collect())
}

impl Schema {
    /// The compiled FOMOD schema.
    pub fn fomod() -> Self {
        Schema::new(
            vec![
                ElementDef::new(CONFIG_ROOT, "moduleConfiguration")
                    .with_doc("The installer configuration document."),
                ElementDef::new(INFO_ROOT, "fomodInfo")
                    .with_doc("The installer metadata document."),
            ],
            config_types().into_iter().chain(info_types()),
        )
    }
}

fn config_types() -> Vec<ComplexType> {
    vec![
        ComplexType::new("moduleConfiguration").content(sequence(vec![
            ElementDef::new("moduleName", "moduleTitle"),
            ElementDef::new("moduleImage", "headerImage").optional(),
            ElementDef::new("moduleDependencies", "compositeDependency")
                .optional()
                .with_doc("Conditions that must hold for the installer to start."),
            ElementDef::new("requiredInstallFiles", "fileList")
                .optional()
                .with_doc("Files that are always installed."),
            ElementDef::new("installSteps", "stepList").optional(),
            ElementDef::new("conditionalFileInstalls", "conditionalFileInstallList")
                .optional()
                .with_doc("Files installed after the last step when their conditions hold."),
        ])),
        text_type("moduleTitle")
            .attribute(
                string_attr("position")
                    .with_enumeration(Enumeration::new("Position", POSITION))
                    .with_default("Left"),
            )
            .attribute(string_attr("colour").with_default("000000")),
        ComplexType::new("headerImage")
            .attribute(string_attr("path").required())
            .attribute(AttributeDef::new("showImage", ValueType::Boolean).with_default("true"))
            .attribute(AttributeDef::new("showFade", ValueType::Boolean).with_default("true"))
            .attribute(AttributeDef::new("height", ValueType::Integer).with_default("-1")),
        ComplexType::new("compositeDependency")
            .content(
                choice(vec![
                    ElementDef::new("fileDependency", "fileDependency"),
                    ElementDef::new("flagDependency", "flagDependency"),
                    ElementDef::new("gameDependency", "versionDependency"),
                    ElementDef::new("fommDependency", "versionDependency"),
                    ElementDef::new("dependencies", "compositeDependency"),
                ])
                .with_occurs(1, MaxOccurs::Unbounded),
            )
            .attribute(
                string_attr("operator")
                    .with_enumeration(Enumeration::new("ConditionType", CONDITION_TYPE))
                    .with_default("And"),
            )
            .with_doc("A boolean combination of dependencies."),
        ComplexType::new("fileDependency")
            .attribute(string_attr("file").required())
            .attribute(
                string_attr("state")
                    .required()
                    .with_enumeration(Enumeration::new("FileType", FILE_TYPE)),
            ),
        ComplexType::new("flagDependency")
            .attribute(string_attr("flag").required())
            .attribute(string_attr("value").required()),
        ComplexType::new("versionDependency").attribute(string_attr("version").required()),
        ComplexType::new("fileList").content(
            choice(vec![
                ElementDef::new("file", "fileType"),
                ElementDef::new("folder", "fileType"),
            ])
            .with_occurs(0, MaxOccurs::Unbounded),
        ),
        ComplexType::new("fileType")
            .attribute(string_attr("source").required())
            .attribute(
                string_attr("destination")
                    .with_doc("Install path relative to the game data folder."),
            )
            .attribute(AttributeDef::new("alwaysInstall", ValueType::Boolean).with_default("false"))
            .attribute(
                AttributeDef::new("installIfUsable", ValueType::Boolean).with_default("false"),
            )
            .attribute(AttributeDef::new("priority", ValueType::Integer).with_default("0")),
        ComplexType::new("stepList")
            .content(sequence(vec![ElementDef::new("installStep", "installStep").repeated()]))
            .attribute(order_attr()),
        ComplexType::new("installStep")
            .content(sequence(vec![
                ElementDef::new("visible", "compositeDependency").optional(),
                ElementDef::new("optionalFileGroups", "groupList"),
            ]))
            .attribute(string_attr("name").required()),
        ComplexType::new("groupList")
            .content(sequence(vec![ElementDef::new("group", "group").repeated()]))
            .attribute(order_attr()),
        ComplexType::new("group")
            .content(sequence(vec![ElementDef::new("plugins", "pluginList")]))
            .attribute(string_attr("name").required())
            .attribute(
                string_attr("type")
                    .required()
                    .with_enumeration(Enumeration::new("GroupType", GROUP_TYPE)),
            ),
        ComplexType::new("pluginList")
            .content(sequence(vec![ElementDef::new("plugin", "plugin").repeated()]))
            .attribute(order_attr()),
        ComplexType::new("plugin")
            .content(sequence(vec![
                ElementDef::new("description", "plainText"),
                ElementDef::new("image", "image").optional(),
                ElementDef::new("files", "fileList").optional(),
                ElementDef::new("conditionFlags", "conditionFlagList").optional(),
                ElementDef::new("typeDescriptor", "pluginTypeDescriptor"),
            ]))
            .attribute(string_attr("name").required()),
        text_type("plainText"),
        ComplexType::new("image").attribute(string_attr("path").required()),
        ComplexType::new("conditionFlagList")
            .content(sequence(vec![ElementDef::new("flag", "setConditionFlag").repeated()])),
        text_type("setConditionFlag").attribute(string_attr("name").required()),
        ComplexType::new("pluginTypeDescriptor").content(choice(vec![
            ElementDef::new("type", "pluginType"),
            ElementDef::new("dependencyType", "dependencyPluginType"),
        ])),
        ComplexType::new("pluginType").attribute(
            string_attr("name")
                .required()
                .with_enumeration(Enumeration::new("OptionType", OPTION_TYPE)),
        ),
        ComplexType::new("dependencyPluginType").content(sequence(vec![
            ElementDef::new("defaultType", "pluginType"),
            ElementDef::new("patterns", "dependencyPatternList"),
        ])),
        ComplexType::new("dependencyPatternList")
            .content(sequence(vec![ElementDef::new("pattern", "dependencyPattern").repeated()])),
        ComplexType::new("dependencyPattern").content(sequence(vec![
            ElementDef::new("dependencies", "compositeDependency"),
            ElementDef::new("type", "pluginType"),
        ])),
        ComplexType::new("conditionalFileInstallList").content(sequence(vec![ElementDef::new(
            "patterns",
            "conditionalInstallPatternList",
        )])),
        ComplexType::new("conditionalInstallPatternList").content(sequence(vec![
            ElementDef::new("pattern", "conditionalInstallPattern").repeated(),
        ])),
        ComplexType::new("conditionalInstallPattern").content(sequence(vec![
            ElementDef::new("dependencies", "compositeDependency"),
            ElementDef::new("files", "fileList"),
        ])),
    ]
}

fn info_types() -> Vec<ComplexType> {
    vec![
        ComplexType::new("fomodInfo").content(sequence(vec![
            ElementDef::new("Name", "plainText").optional(),
            ElementDef::new("Author", "plainText").optional(),
            ElementDef::new("Version", "infoVersion").optional(),
            ElementDef::new("Id", "plainText").optional(),
            ElementDef::new("Website", "plainText").optional(),
            ElementDef::new("Description", "plainText").optional(),
            ElementDef::new("Groups", "infoGroups").optional(),
        ])),
        text_type("infoVersion").attribute(string_attr("MachineVersion")),
        ComplexType::new("infoGroups").content(sequence(vec![ElementDef::new(
            "element",
            "plainText",
        )
        .optional()
        .repeated()])),
    ]
}
