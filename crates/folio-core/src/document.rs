//! Document and page model.

use crate::block::{Block, BlockId};
use crate::geometry::{Orientation, PageFormat, page_display_size, to_display};
use crate::theme::Theme;
use chrono::{DateTime, Utc};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for a document.
pub type DocumentId = String;

/// Unique identifier for a page.
pub type PageId = String;

/// Layout format version written into new documents.
pub const DOCUMENT_VERSION: u32 = 1;

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Page background. Keys this build does not know are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBackground {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Image URL drawn over the color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageBackground {
    pub fn color(color: impl Into<String>) -> Self {
        Self { color: Some(color.into()), image: None, opacity: None, extra: Map::new() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self { color: None, image: Some(url.into()), opacity: None, extra: Map::new() }
    }
}

/// A page. Blocks are stored in paint order: later blocks draw on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    /// 1-based position of the page in the document.
    pub page_number: u32,
    pub format: PageFormat,
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<PageBackground>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(page_number: u32, format: PageFormat, orientation: Orientation) -> Self {
        Self { id: new_id(), page_number, format, orientation, background: None, blocks: Vec::new() }
    }

    /// Page size in display pixels.
    pub fn display_size(&self) -> Size {
        page_display_size(self.format, self.orientation)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn block_index(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// Topmost block under a point given in page display pixels.
    pub fn block_at(&self, point: Point) -> Option<&Block> {
        let size = self.display_size();
        self.blocks.iter().rev().find(|b| to_display(&b.position, size).contains(point))
    }
}

/// The whole editable layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub format: PageFormat,
    pub orientation: Orientation,
    pub theme: Theme,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

/// Structural problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("duplicate page id: {0}")]
    DuplicatePageId(PageId),
    #[error("duplicate block id: {0}")]
    DuplicateBlockId(BlockId),
    #[error("empty id in document")]
    EmptyId,
}

impl Document {
    /// New document with no pages.
    pub fn new(title: impl Into<String>, format: PageFormat, orientation: Orientation, theme: Theme) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            format,
            orientation,
            theme,
            pages: Vec::new(),
            created_at: now,
            updated_at: now,
            version: DOCUMENT_VERSION,
        }
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    pub fn page_index(&self, id: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    pub fn block(&self, page_id: &str, block_id: &str) -> Option<&Block> {
        self.page(page_id)?.block(block_id)
    }

    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|p| p.blocks.len()).sum()
    }

    /// Reassign page numbers `1..=n` in list order.
    pub fn renumber_pages(&mut self) {
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.page_number = i as u32 + 1;
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Check id uniqueness across the whole document.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut page_ids = HashSet::new();
        let mut block_ids = HashSet::new();
        for page in &self.pages {
            if page.id.is_empty() {
                return Err(ValidationError::EmptyId);
            }
            if !page_ids.insert(page.id.as_str()) {
                return Err(ValidationError::DuplicatePageId(page.id.clone()));
            }
            for block in &page.blocks {
                if block.id.is_empty() {
                    return Err(ValidationError::EmptyId);
                }
                if !block_ids.insert(block.id.as_str()) {
                    return Err(ValidationError::DuplicateBlockId(block.id.clone()));
                }
            }
        }
        Ok(())
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
