use std::rc::Rc;

use thiserror::Error;

use super::store::{Reducer, Store};
use crate::api::{ApiError, DocumentSource, UploadBackend, UploadFile};
use crate::types::{Category, DocumentInfo};

pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "docx", "txt", "md"];

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("uploads are disabled while another upload is running")]
    Disabled,
    #[error("no files were selected")]
    NoFiles,
    #[error("{name}: {reason}")]
    Rejected { name: String, reason: String },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Checks a drop/browse selection before it is handed to the coordinator.
pub fn validate_files(files: &[UploadFile]) -> Result<(), UploadError> {
    if files.is_empty() {
        return Err(UploadError::NoFiles);
    }

    for file in files {
        let supported = file
            .extension()
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()));
        if !supported {
            return Err(UploadError::Rejected {
                name: file.name.clone(),
                reason: format!("unsupported file type (use {})", SUPPORTED_EXTENSIONS.join(", ")),
            });
        }
        if file.bytes.len() > MAX_FILE_SIZE {
            return Err(UploadError::Rejected {
                name: file.name.clone(),
                reason: format!("larger than {} MB", MAX_FILE_SIZE / (1024 * 1024)),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryState {
    pub documents: Vec<DocumentInfo>,
    pub category: Option<Category>,
    /// Set while an upload is running; new uploads are refused.
    pub disabled: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum LibraryAction {
    UploadStarted,
    UploadFinished(Result<Vec<DocumentInfo>, String>),
    LoadStarted(Option<Category>),
    LoadFinished(Result<Vec<DocumentInfo>, String>),
}

impl LibraryState {
    fn merge(&mut self, incoming: Vec<DocumentInfo>) {
        for doc in incoming {
            match self.documents.iter_mut().find(|d| d.id == doc.id) {
                Some(existing) => *existing = doc,
                None => self.documents.push(doc),
            }
        }
    }
}

impl Reducer for LibraryState {
    type Action = LibraryAction;

    fn reduce(&mut self, action: LibraryAction) {
        match action {
            LibraryAction::UploadStarted => {
                self.disabled = true;
                self.error = None;
            }
            LibraryAction::UploadFinished(result) => {
                self.disabled = false;
                match result {
                    Ok(docs) => self.merge(docs),
                    Err(e) => self.error = Some(e),
                }
            }
            LibraryAction::LoadStarted(category) => {
                self.category = category;
                self.loading = true;
                self.error = None;
            }
            LibraryAction::LoadFinished(result) => {
                self.loading = false;
                match result {
                    Ok(docs) => self.documents = docs,
                    Err(e) => self.error = Some(e),
                }
            }
        }
    }
}

/// Owns the visible document list: uploads merge into it, loads replace it.
pub struct UploadCoordinator<B> {
    store: Store<LibraryState>,
    backend: Rc<B>,
}

impl<B> Clone for UploadCoordinator<B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            backend: Rc::clone(&self.backend),
        }
    }
}

impl<B> UploadCoordinator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            store: Store::default(),
            backend: Rc::new(backend),
        }
    }

    pub fn store(&self) -> &Store<LibraryState> {
        &self.store
    }
}

impl<B: UploadBackend> UploadCoordinator<B> {
    /// Forwards the files as given and merges the returned documents by id.
    pub async fn upload(&self, files: Vec<UploadFile>) -> Result<usize, UploadError> {
        if self.store.with(|state| state.disabled) {
            log::warn!("upload refused: another upload is in progress");
            return Err(UploadError::Disabled);
        }
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }

        self.store.dispatch(LibraryAction::UploadStarted);
        let result = self.backend.upload(files).await;

        match result {
            Ok(docs) => {
                let count = docs.len();
                self.store.dispatch(LibraryAction::UploadFinished(Ok(docs)));
                Ok(count)
            }
            Err(e) => {
                log::error!("upload failed: {}", e);
                self.store
                    .dispatch(LibraryAction::UploadFinished(Err(e.to_string())));
                Err(UploadError::Api(e))
            }
        }
    }
}

impl<B: DocumentSource> UploadCoordinator<B> {
    pub async fn load_documents(&self, category: Option<Category>) -> Result<usize, ApiError> {
        self.store.dispatch(LibraryAction::LoadStarted(category));

        match self.backend.list_documents(category).await {
            Ok(docs) => {
                let count = docs.len();
                self.store.dispatch(LibraryAction::LoadFinished(Ok(docs)));
                Ok(count)
            }
            Err(e) => {
                log::error!("failed to load documents: {}", e);
                self.store
                    .dispatch(LibraryAction::LoadFinished(Err(e.to_string())));
                Err(e)
            }
        }
    }
}
