pub mod chat;
pub mod document_viewer;
pub mod history;
pub mod markdown;
pub mod search;
pub mod theme_selector;
pub mod tooltip;
pub mod upload;
