use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// The kinds of block the editor knows about.
///
/// `Quote` and `Code` are declared in the registry so documents can carry
/// them, but neither has a specialized editor behavior yet: they edit as
/// plain blocks. (TODO: dedicated quote/code editing once the dashboard
/// editor grows beyond headings and text.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,
    #[serde(rename = "h1")]
    Heading1,
    #[serde(rename = "h2")]
    Heading2,
    #[serde(rename = "h3")]
    Heading3,
    Quote,
    Code,
}

/// One immutable registry entry: a block kind plus its display label and
/// the placeholder shown while the block is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub kind: BlockKind,
    pub label: &'static str,
    pub placeholder: &'static str,
}

/// The static block type registry, loaded once and never mutated.
const REGISTRY: &[TypeInfo] = &[
    TypeInfo {
        kind: BlockKind::Paragraph,
        label: "Text",
        placeholder: "Start writing",
    },
    TypeInfo {
        kind: BlockKind::Heading1,
        label: "Heading 1",
        placeholder: "Heading 1",
    },
    TypeInfo {
        kind: BlockKind::Heading2,
        label: "Heading 2",
        placeholder: "Heading 2",
    },
    TypeInfo {
        kind: BlockKind::Heading3,
        label: "Heading 3",
        placeholder: "Heading 3",
    },
    TypeInfo {
        kind: BlockKind::Quote,
        label: "Quote",
        placeholder: "Quote",
    },
    TypeInfo {
        kind: BlockKind::Code,
        label: "Code",
        placeholder: "Code snippet",
    },
];

impl TypeInfo {
    /// All registry entries in declaration order.
    pub fn all() -> &'static [TypeInfo] {
        REGISTRY
    }

    /// Look up the registry entry for a block kind.
    pub fn for_kind(kind: BlockKind) -> &'static TypeInfo {
        REGISTRY
            .iter()
            .find(|info| info.kind == kind)
            .expect("every BlockKind has a registry entry")
    }
}

impl BlockKind {
    /// Display label shown as the empty-state tag for blocks of this kind.
    pub fn label(self) -> &'static str {
        TypeInfo::for_kind(self).label
    }

    /// Placeholder text shown inside an empty block of this kind.
    pub fn placeholder(self) -> &'static str {
        TypeInfo::for_kind(self).placeholder
    }

    /// Stable lowercase name used in config files and host APIs.
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading1 => "h1",
            BlockKind::Heading2 => "h2",
            BlockKind::Heading3 => "h3",
            BlockKind::Quote => "quote",
            BlockKind::Code => "code",
        }
    }

    /// Parse a kind from its stable name.
    pub fn from_name(name: &str) -> Result<Self, EditError> {
        REGISTRY
            .iter()
            .map(|info| info.kind)
            .find(|kind| kind.name() == name)
            .ok_or_else(|| EditError::UnknownType(name.to_string()))
    }

    /// Whether this kind is any heading level.
    pub fn is_heading(self) -> bool {
        matches!(
            self,
            BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3
        )
    }
}
