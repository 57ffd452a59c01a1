//! UI state containers. Everything here is plain Rust driven by typed
//! actions; the leptos components only subscribe and render.

pub mod chat;
pub mod citation;
pub mod history;
pub mod store;
pub mod touch;
pub mod upload;
pub mod viewer;

pub use chat::{ChatAction, ChatController, ChatState, SendError};
pub use citation::{CitationResolver, SlugResolver};
pub use history::{filter_groups, group_conversations, ConversationGroup};
pub use store::{ListenerId, Reducer, Store};
pub use touch::{Drawer, PullPhase, PullToRefresh};
pub use upload::{validate_files, LibraryState, UploadCoordinator, UploadError};
pub use viewer::{DocumentViewer, DocumentViewerState, ViewerAction};
