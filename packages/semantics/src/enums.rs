//! Attribute enumerations of the configuration format.
//!
//! Every enumeration defaults to its first member.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! fomod_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Parse `value`, falling back to the default for anything unknown.
            pub fn parse_or_default(value: Option<&str>) -> Self {
                value.and_then(|v| v.parse().ok()).unwrap_or_default()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

fomod_enum!(
    /// How a condition combines its atoms.
    ConditionType {
        And => "And",
        Or => "Or",
    }
);

fomod_enum!(
    /// Presence of a file in the user's setup.
    FileType {
        Active => "Active",
        Inactive => "Inactive",
        Missing => "Missing",
    }
);

fomod_enum!(
    Order {
        Ascending => "Ascending",
        Descending => "Descending",
        Explicit => "Explicit",
    }
);

fomod_enum!(
    /// Selection policy of a group.
    GroupType {
        SelectAny => "SelectAny",
        SelectAll => "SelectAll",
        SelectAtLeastOne => "SelectAtLeastOne",
        SelectAtMostOne => "SelectAtMostOne",
        SelectExactlyOne => "SelectExactlyOne",
    }
);

fomod_enum!(
    OptionType {
        Optional => "Optional",
        Required => "Required",
        Recommended => "Recommended",
        NotUsable => "NotUsable",
        CouldBeUsable => "CouldBeUsable",
    }
);

impl Order {
    /// Arrange `items` by this order. Sorting by name is stable.
    pub fn arrange<T>(self, items: &mut [T], name: impl Fn(&T) -> &str) {
        match self {
            Order::Ascending => items.sort_by(|a, b| name(a).cmp(name(b))),
            Order::Descending => items.sort_by(|a, b| name(b).cmp(name(a))),
            Order::Explicit => {}
        }
    }
}

impl GroupType {
    /// Does `count` selected options out of `available` satisfy the policy?
    pub fn accepts(self, count: usize, available: usize) -> bool {
        match self {
            GroupType::SelectAny => true,
            GroupType::SelectAll => count == available,
            GroupType::SelectAtLeastOne => count >= 1,
            GroupType::SelectAtMostOne => count <= 1,
            GroupType::SelectExactlyOne => count == 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_member_is_default() {
        assert_eq!(ConditionType::default(), ConditionType::And);
        assert_eq!(FileType::default(), FileType::Active);
        assert_eq!(Order::default(), Order::Ascending);
        assert_eq!(GroupType::default(), GroupType::SelectAny);
        assert_eq!(OptionType::default(), OptionType::Optional);
    }

    #[test]
    fn test_parse() {
        assert_eq!("SelectAll".parse::<GroupType>(), Ok(GroupType::SelectAll));
        assert_eq!(
            "selectall".parse::<GroupType>(),
            Err(UnknownVariant {
                kind: "GroupType",
                value: "selectall".to_string()
            })
        );
        assert_eq!(OptionType::parse_or_default(Some("Bogus")), OptionType::Optional);
        assert_eq!(OptionType::parse_or_default(Some("NotUsable")), OptionType::NotUsable);
    }

    #[test]
    fn test_arrange() {
        let mut names = vec!["b", "c", "a"];
        Order::Ascending.arrange(&mut names, |n| *n);
        assert_eq!(names, vec!["a", "b", "c"]);
        Order::Descending.arrange(&mut names, |n| *n);
        assert_eq!(names, vec!["c", "b", "a"]);
        let mut names = vec!["b", "c", "a"];
        Order::Explicit.arrange(&mut names, |n| *n);
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_group_policies() {
        assert!(GroupType::SelectAny.accepts(0, 3));
        assert!(!GroupType::SelectAll.accepts(2, 3));
        assert!(GroupType::SelectAll.accepts(3, 3));
        assert!(!GroupType::SelectAtLeastOne.accepts(0, 3));
        assert!(!GroupType::SelectAtMostOne.accepts(2, 3));
        assert!(GroupType::SelectExactlyOne.accepts(1, 3));
        assert!(!GroupType::SelectExactlyOne.accepts(0, 3));
    }

    #[test]
    fn test_serde_uses_document_spelling() {
        let json = serde_json::to_string(&GroupType::SelectExactlyOne).unwrap();
        assert_eq!(json, "\"SelectExactlyOne\"");
        let parsed: FileType = serde_json::from_str("\"Missing\"").unwrap();
        assert_eq!(parsed, FileType::Missing);
    }
}
