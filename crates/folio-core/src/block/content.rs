//! Typed block content.

use super::{BlockType, ContentKind, same_json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content of a block. The expected variant depends on the block type.
///
/// Payloads that do not match the typed shape for their block type (or
/// belong to an unknown type) are kept verbatim in [`BlockContent::Raw`].
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text(String),
    Image(ImageContent),
    Gallery(GalleryContent),
    Map(MapContent),
    Checklist(ChecklistContent),
    Table(TableContent),
    Raw(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    Cover,
    Contain,
    Fill,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageContent {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<ImageFit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryContent {
    #[serde(default)]
    pub images: Vec<GalleryImage>,
    pub columns: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
}

impl Default for GalleryContent {
    fn default() -> Self {
        Self { images: Vec::new(), columns: 2, gap: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MapContent {
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecklistContent {
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableContent {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bordered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub striped: Option<bool>,
}

impl BlockContent {
    /// Content a freshly added block of this type starts with.
    pub fn default_for(block_type: &BlockType) -> Self {
        match block_type {
            t if t.is_heading() => BlockContent::Text("Heading".to_string()),
            BlockType::Paragraph => BlockContent::Text("Paragraph text".to_string()),
            BlockType::Image | BlockType::ImageWithCaption => BlockContent::Image(ImageContent {
                alt: Some(String::new()),
                ..ImageContent::default()
            }),
            BlockType::ImageGallery => BlockContent::Gallery(GalleryContent::default()),
            BlockType::Map => BlockContent::Map(MapContent::default()),
            BlockType::Checklist => BlockContent::Checklist(ChecklistContent::default()),
            BlockType::Table => BlockContent::Table(TableContent::default()),
            _ => BlockContent::Text(String::new()),
        }
    }

    /// Decode a wire payload for a block of `block_type`.
    pub fn from_value(block_type: &BlockType, value: Value) -> Self {
        match block_type.content_kind() {
            ContentKind::Text | ContentKind::Opaque => Self::untyped(value),
            ContentKind::Image => Self::typed(value, BlockContent::Image),
            ContentKind::Gallery => Self::typed(value, BlockContent::Gallery),
            ContentKind::Map => Self::typed(value, BlockContent::Map),
            ContentKind::Checklist => Self::typed(value, BlockContent::Checklist),
            ContentKind::Table => Self::typed(value, BlockContent::Table),
        }
    }

    /// Typed decode, kept only when it encodes back to the same payload.
    fn typed<T: DeserializeOwned + Serialize>(value: Value, wrap: fn(T) -> Self) -> Self {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(content) if serde_json::to_value(&content).is_ok_and(|v| same_json(&v, &value)) => wrap(content),
            _ => Self::untyped(value),
        }
    }

    fn untyped(value: Value) -> Self {
        match value {
            Value::String(text) => BlockContent::Text(text),
            other => BlockContent::Raw(other),
        }
    }

    /// Encode to the wire payload.
    pub fn into_value(self) -> Value {
        let encoded = match self {
            BlockContent::Text(text) => return Value::String(text),
            BlockContent::Raw(value) => return value,
            BlockContent::Image(c) => serde_json::to_value(c),
            BlockContent::Gallery(c) => serde_json::to_value(c),
            BlockContent::Map(c) => serde_json::to_value(c),
            BlockContent::Checklist(c) => serde_json::to_value(c),
            BlockContent::Table(c) => serde_json::to_value(c),
        };
        encoded.unwrap_or(Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BlockContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Image URLs referenced by this content.
    pub fn image_urls(&self) -> Vec<&str> {
        match self {
            BlockContent::Image(image) => vec![image.url.as_str()],
            BlockContent::Gallery(gallery) => gallery.images.iter().map(|i| i.url.as_str()).collect(),
            BlockContent::Map(map) => vec![map.image_url.as_str()],
            _ => Vec::new(),
        }
    }
}

impl Default for BlockContent {
    fn default() -> Self {
        BlockContent::Text(String::new())
    }
}
