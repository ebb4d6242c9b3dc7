//! Pointer and keyboard gestures on blocks.
//!
//! Each gesture keeps its own state in display pixels and only produces a
//! stored value on completion; the caller decides whether to commit it.

mod drag;
mod handles;
mod resize;
mod text_edit;

pub use drag::DragState;
pub use handles::{HANDLE_HIT_TOLERANCE, HANDLE_SIZE, Handle, handles_for, hit_test_handles};
pub use resize::ResizeState;
pub use text_edit::{TextEditResult, TextEditSession, TextKey, TextModifiers, starts_edit};
