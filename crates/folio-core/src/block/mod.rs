//! Content blocks placed on a page.

mod content;
mod style;

pub use content::{
    BlockContent, ChecklistContent, ChecklistItem, GalleryContent, GalleryImage, ImageContent, ImageFit,
    MapContent, TableContent,
};
pub use style::{Border, DropShadow, Insets, Padding, PaddingSides, ResolvedStyle, Shadow, Styles, TextAlign};

use crate::geometry::Position;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for a block.
pub type BlockId = String;

/// Generate a fresh, globally unique block id.
pub fn new_block_id() -> BlockId {
    Uuid::new_v4().to_string()
}

/// Kind of a block.
///
/// Serialized as a kebab-case string. Type names this build does not know
/// are kept in [`BlockType::Unknown`] so documents from newer editors load
/// and save without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    HeadingH1,
    HeadingH2,
    HeadingH3,
    Paragraph,
    Image,
    ImageWithCaption,
    ImageGallery,
    Map,
    TipBlock,
    ImportantBlock,
    WarningBlock,
    Quote,
    Checklist,
    Table,
    Divider,
    Spacer,
    Cover,
    Toc,
    AuthorBlock,
    RecommendationsBlock,
    BackgroundBlock,
    Unknown(String),
}

/// Shape of the content a block type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Image,
    Gallery,
    Map,
    Checklist,
    Table,
    /// Anything the model does not interpret.
    Opaque,
}

impl BlockType {
    /// Every type this build knows about.
    pub const KNOWN: [BlockType; 21] = [
        BlockType::HeadingH1,
        BlockType::HeadingH2,
        BlockType::HeadingH3,
        BlockType::Paragraph,
        BlockType::Image,
        BlockType::ImageWithCaption,
        BlockType::ImageGallery,
        BlockType::Map,
        BlockType::TipBlock,
        BlockType::ImportantBlock,
        BlockType::WarningBlock,
        BlockType::Quote,
        BlockType::Checklist,
        BlockType::Table,
        BlockType::Divider,
        BlockType::Spacer,
        BlockType::Cover,
        BlockType::Toc,
        BlockType::AuthorBlock,
        BlockType::RecommendationsBlock,
        BlockType::BackgroundBlock,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            BlockType::HeadingH1 => "heading-h1",
            BlockType::HeadingH2 => "heading-h2",
            BlockType::HeadingH3 => "heading-h3",
            BlockType::Paragraph => "paragraph",
            BlockType::Image => "image",
            BlockType::ImageWithCaption => "image-with-caption",
            BlockType::ImageGallery => "image-gallery",
            BlockType::Map => "map",
            BlockType::TipBlock => "tip-block",
            BlockType::ImportantBlock => "important-block",
            BlockType::WarningBlock => "warning-block",
            BlockType::Quote => "quote",
            BlockType::Checklist => "checklist",
            BlockType::Table => "table",
            BlockType::Divider => "divider",
            BlockType::Spacer => "spacer",
            BlockType::Cover => "cover",
            BlockType::Toc => "toc",
            BlockType::AuthorBlock => "author-block",
            BlockType::RecommendationsBlock => "recommendations-block",
            BlockType::BackgroundBlock => "background-block",
            BlockType::Unknown(name) => name,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, BlockType::HeadingH1 | BlockType::HeadingH2 | BlockType::HeadingH3)
    }

    pub fn is_callout(&self) -> bool {
        matches!(self, BlockType::TipBlock | BlockType::ImportantBlock | BlockType::WarningBlock)
    }

    /// Whether the block's content is plain text the inline editor can edit.
    pub fn is_text(&self) -> bool {
        self.content_kind() == ContentKind::Text
    }

    pub fn content_kind(&self) -> ContentKind {
        match self {
            BlockType::HeadingH1
            | BlockType::HeadingH2
            | BlockType::HeadingH3
            | BlockType::Paragraph
            | BlockType::TipBlock
            | BlockType::ImportantBlock
            | BlockType::WarningBlock
            | BlockType::Quote => ContentKind::Text,
            BlockType::Image | BlockType::ImageWithCaption => ContentKind::Image,
            BlockType::ImageGallery => ContentKind::Gallery,
            BlockType::Map => ContentKind::Map,
            BlockType::Checklist => ContentKind::Checklist,
            BlockType::Table => ContentKind::Table,
            // Structured or empty payloads the renderer interprets; kept verbatim.
            BlockType::Divider
            | BlockType::Spacer
            | BlockType::Cover
            | BlockType::Toc
            | BlockType::AuthorBlock
            | BlockType::RecommendationsBlock
            | BlockType::BackgroundBlock
            | BlockType::Unknown(_) => ContentKind::Opaque,
        }
    }
}

impl From<&str> for BlockType {
    fn from(name: &str) -> Self {
        BlockType::KNOWN
            .iter()
            .find(|t| t.as_str() == name)
            .cloned()
            .unwrap_or_else(|| BlockType::Unknown(name.to_string()))
    }
}

impl From<String> for BlockType {
    fn from(name: String) -> Self {
        match BlockType::from(name.as_str()) {
            BlockType::Unknown(_) => BlockType::Unknown(name),
            known => known,
        }
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: BlockId,
    pub block_type: BlockType,
    pub position: Position,
    pub styles: Styles,
    pub content: BlockContent,
}

/// A block that has not been placed yet (no id).
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlock {
    pub block_type: BlockType,
    pub position: Position,
    pub styles: Styles,
    pub content: BlockContent,
}

impl NewBlock {
    /// New block with the default content for its type and no style overrides.
    pub fn new(block_type: BlockType, position: Position) -> Self {
        let content = BlockContent::default_for(&block_type);
        Self { block_type, position, styles: Styles::default(), content }
    }

    pub fn with_content(mut self, content: BlockContent) -> Self {
        self.content = content;
        self
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    /// Assign a fresh id.
    pub fn into_block(self) -> Block {
        Block {
            id: new_block_id(),
            block_type: self.block_type,
            position: self.position,
            styles: self.styles,
            content: self.content,
        }
    }
}

impl Block {
    /// Strip the id, e.g. to put the block on the clipboard.
    pub fn to_new_block(&self) -> NewBlock {
        NewBlock {
            block_type: self.block_type.clone(),
            position: self.position,
            styles: self.styles.clone(),
            content: self.content.clone(),
        }
    }
}

/// Whether `decoded` encodes back to `original`. Numbers compare by value,
/// so `24` and `24.0` match.
pub(crate) fn same_json(decoded: &Value, original: &Value) -> bool {
    match (decoded, original) {
        (Value::Number(a), Value::Number(b)) => a == b || a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_json(x, y)),
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| same_json(v, w)))
        }
        _ => decoded == original,
    }
}

/// Wire form of a block: content stays untyped until the block type is known.
#[derive(Serialize, Deserialize)]
struct RawBlock {
    id: BlockId,
    #[serde(rename = "type")]
    block_type: BlockType,
    position: Position,
    #[serde(default)]
    styles: Styles,
    #[serde(default)]
    content: Value,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let content = BlockContent::from_value(&raw.block_type, raw.content);
        Block {
            id: raw.id,
            block_type: raw.block_type,
            position: raw.position,
            styles: raw.styles,
            content,
        }
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        RawBlock {
            id: block.id,
            block_type: block.block_type,
            position: block.position,
            styles: block.styles,
            content: block.content.into_value(),
        }
    }
}
