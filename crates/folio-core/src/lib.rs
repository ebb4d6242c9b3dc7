//! Folio Core Library
//!
//! Document model and editing engine for the Folio page-layout constructor:
//! pages of positioned content blocks, themes, undo history, persistence and
//! PDF export orchestration.

pub mod block;
pub mod builder;
pub mod clipboard;
pub mod config;
pub mod document;
pub mod export;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod service;
pub mod session;
pub mod storage;
pub mod theme;
pub mod viewport;

pub use block::{Block, BlockContent, BlockId, BlockType, NewBlock, Styles};
pub use builder::{BlockUpdate, DocumentBuilder, ImportError, parse_layout};
pub use clipboard::{Clipboard, SharedClipboard};
pub use config::{ConfigError, EditorConfig};
pub use document::{Document, DocumentId, Page, PageBackground, PageId, ValidationError};
pub use export::{ExportArtifact, ExportConfig, ExportError, PageRenderer, PdfAssembler, RenderedPage};
pub use geometry::{Orientation, PageFormat, Position, ResizeHandle, Unit};
pub use history::HistoryManager;
pub use service::{ConstructorService, ContentImporter};
pub use session::{EditorSession, PointerTarget};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use theme::{Theme, ThemeManager};
pub use viewport::PageViewport;
