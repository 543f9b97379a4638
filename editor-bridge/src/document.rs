//! The slice of the document model the bridge needs to see.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading,
    Image,
    Other(String),
}

impl BlockKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "paragraph" => Self::Paragraph,
            "heading" => Self::Heading,
            "image" => Self::Image,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Top-level block as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub kind: BlockKind,
    pub text: String,
}

impl BlockInfo {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
        }
    }

    /// Only paragraphs qualify; a trailing image is never an insertion point.
    pub fn is_empty_paragraph(&self) -> bool {
        self.kind == BlockKind::Paragraph && self.text.is_empty()
    }
}
