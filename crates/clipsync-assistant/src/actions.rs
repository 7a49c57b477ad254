//! Smart actions offered for shared items.

use std::fmt;

use clipsync_core::ItemKind;
use serde::{Deserialize, Serialize};

/// An on-demand assistant transformation of a single item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SmartAction {
    Summarize,
    Describe,
    FormatCode,
    Organize,
    /// Any other verb; sent through the generic template.
    Other(String),
}

impl SmartAction {
    /// Wire name of the action.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Summarize => "summarize",
            Self::Describe => "describe",
            Self::FormatCode => "format_code",
            Self::Organize => "organize",
            Self::Other(name) => name,
        }
    }

    /// Button label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Summarize => "Summarize",
            Self::Describe => "Describe",
            Self::FormatCode => "Format Code",
            Self::Organize => "Organize",
            Self::Other(name) if name == "search" => "Search",
            Self::Other(name) if name.is_empty() => "Action",
            Self::Other(name) => name,
        }
    }

    /// Natural-language instruction embedding the item content.
    #[must_use]
    pub fn instruction(&self, content: &str) -> String {
        match self {
            Self::Summarize => format!("Summarize the following text:\n\n{content}"),
            Self::Describe => format!("Describe the following content:\n\n{content}"),
            Self::FormatCode => {
                format!("Format and detect the language of this code snippet:\n\n{content}")
            }
            Self::Organize => format!("Organize and categorize the following content:\n\n{content}"),
            Self::Other(name) => format!("{name} the following:\n\n{content}"),
        }
    }

    /// Actions offered for an item of the given kind.
    #[must_use]
    pub fn available_for(kind: ItemKind) -> Vec<Self> {
        match kind {
            ItemKind::Code => vec![Self::FormatCode, Self::Summarize, Self::Describe],
            ItemKind::Text | ItemKind::File | ItemKind::Image => {
                vec![Self::Summarize, Self::Describe, Self::Organize]
            }
        }
    }
}

impl From<&str> for SmartAction {
    fn from(name: &str) -> Self {
        match name {
            "summarize" => Self::Summarize,
            "describe" => Self::Describe,
            "format_code" => Self::FormatCode,
            "organize" => Self::Organize,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for SmartAction {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<SmartAction> for String {
    fn from(action: SmartAction) -> Self {
        match action {
            SmartAction::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SmartAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instruction for searching the session's items.
#[must_use]
pub fn search_instruction(query: &str, items_summary: &str) -> String {
    format!("Search through these transfer items for: \"{query}\"\n\nItems:\n{items_summary}")
}
