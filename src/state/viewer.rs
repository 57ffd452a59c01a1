use super::citation::CitationResolver;
use super::store::{Reducer, Store};
use crate::types::Citation;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentViewerState {
    pub is_open: bool,
    pub document_url: Option<String>,
    pub document_title: Option<String>,
    pub current_page: u32,
    highlighted: Vec<Citation>,
}

impl Default for DocumentViewerState {
    fn default() -> Self {
        Self {
            is_open: false,
            document_url: None,
            document_title: None,
            current_page: 1,
            highlighted: Vec::new(),
        }
    }
}

impl DocumentViewerState {
    /// Highlighted citations in insertion order; ids are unique.
    pub fn highlighted_citations(&self) -> &[Citation] {
        &self.highlighted
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.highlighted.iter().any(|c| c.id == id)
    }

    fn insert_highlight(&mut self, citation: Citation) {
        if !self.is_highlighted(&citation.id) {
            self.highlighted.push(citation);
        }
    }
}

#[derive(Debug)]
pub enum ViewerAction {
    Open {
        url: String,
        title: String,
        page: u32,
        citations: Vec<Citation>,
    },
    Close,
    Reopen,
    SetPage(u32),
    AddHighlight(Citation),
    RemoveHighlight(String),
    ClearHighlights,
}

impl Reducer for DocumentViewerState {
    type Action = ViewerAction;

    fn reduce(&mut self, action: ViewerAction) {
        match action {
            ViewerAction::Open {
                url,
                title,
                page,
                citations,
            } => {
                *self = DocumentViewerState {
                    is_open: true,
                    document_url: Some(url),
                    document_title: Some(title),
                    current_page: page.max(1),
                    highlighted: Vec::new(),
                };
                for citation in citations {
                    self.insert_highlight(citation);
                }
            }
            ViewerAction::Close => self.is_open = false,
            ViewerAction::Reopen => {
                if self.document_url.is_some() {
                    self.is_open = true;
                }
            }
            ViewerAction::SetPage(page) => self.current_page = page.max(1),
            ViewerAction::AddHighlight(citation) => self.insert_highlight(citation),
            ViewerAction::RemoveHighlight(id) => self.highlighted.retain(|c| c.id != id),
            ViewerAction::ClearHighlights => self.highlighted.clear(),
        }
    }
}

/// Tracks the open document, its page and the highlighted citations.
#[derive(Clone, Default)]
pub struct DocumentViewer {
    store: Store<DocumentViewerState>,
    fallback_url: Option<String>,
}

impl DocumentViewer {
    pub fn new(fallback_url: Option<String>) -> Self {
        Self {
            store: Store::default(),
            fallback_url,
        }
    }

    pub fn store(&self) -> &Store<DocumentViewerState> {
        &self.store
    }

    pub fn open_document(
        &self,
        url: impl Into<String>,
        title: impl Into<String>,
        page: Option<u32>,
        citations: Vec<Citation>,
    ) {
        self.store.dispatch(ViewerAction::Open {
            url: url.into(),
            title: title.into(),
            page: page.unwrap_or(1),
            citations,
        });
    }

    /// Opens the document a citation points at, highlighting that citation.
    /// Returns false when neither the resolver nor the fallback url yields a
    /// document.
    pub fn open_citation(&self, citation: &Citation, resolver: &impl CitationResolver) -> bool {
        let url = resolver
            .resolve(citation)
            .or_else(|| {
                log::warn!("no document url for citation {}, using fallback", citation.id);
                self.fallback_url.clone()
            });

        match url {
            Some(url) => {
                self.open_document(url, citation.title.clone(), None, vec![citation.clone()]);
                true
            }
            None => {
                log::warn!("citation {} could not be opened", citation.id);
                false
            }
        }
    }

    pub fn close_document(&self) {
        self.store.dispatch(ViewerAction::Close);
    }

    pub fn reopen(&self) {
        self.store.dispatch(ViewerAction::Reopen);
    }

    pub fn set_page(&self, page: u32) {
        self.store.dispatch(ViewerAction::SetPage(page));
    }

    pub fn add_highlighted_citation(&self, citation: Citation) {
        self.store.dispatch(ViewerAction::AddHighlight(citation));
    }

    pub fn remove_highlighted_citation(&self, id: &str) {
        self.store.dispatch(ViewerAction::RemoveHighlight(id.to_string()));
    }

    pub fn clear_highlights(&self) {
        self.store.dispatch(ViewerAction::ClearHighlights);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::citation::SlugResolver;

    fn citation(id: &str) -> Citation {
        Citation::new("Bylaws", "Bylaws").with_id(id)
    }

    #[test]
    fn open_replaces_state_and_shows_viewer() {
        let viewer = DocumentViewer::default();
        viewer.open_document("http://a/1.pdf", "One", Some(4), vec![citation("x")]);
        viewer.open_document("http://a/2.pdf", "Two", None, vec![]);

        let state = viewer.store().snapshot();
        assert!(state.is_open);
        assert_eq!(state.document_url.as_deref(), Some("http://a/2.pdf"));
        assert_eq!(state.current_page, 1);
        assert!(state.highlighted_citations().is_empty());
    }

    #[test]
    fn close_keeps_the_document_for_reopen() {
        let viewer = DocumentViewer::default();
        viewer.open_document("http://a/1.pdf", "One", Some(3), vec![]);
        viewer.close_document();

        let closed = viewer.store().snapshot();
        assert!(!closed.is_open);
        assert_eq!(closed.document_title.as_deref(), Some("One"));

        viewer.reopen();
        let reopened = viewer.store().snapshot();
        assert!(reopened.is_open);
        assert_eq!(reopened.current_page, 3);
    }

    #[test]
    fn reopen_without_document_stays_closed() {
        let viewer = DocumentViewer::default();
        viewer.reopen();
        assert!(!viewer.store().with(|s| s.is_open));
    }

    #[test]
    fn adding_the_same_citation_twice_is_idempotent() {
        let viewer = DocumentViewer::default();
        viewer.add_highlighted_citation(citation("c1"));
        viewer.add_highlighted_citation(citation("c1"));

        assert_eq!(viewer.store().with(|s| s.highlighted_citations().len()), 1);

        viewer.remove_highlighted_citation("c1");
        viewer.remove_highlighted_citation("missing");
        assert!(viewer.store().with(|s| s.highlighted_citations().is_empty()));
    }

    #[test]
    fn open_deduplicates_initial_citations() {
        let viewer = DocumentViewer::default();
        viewer.open_document("u", "t", None, vec![citation("a"), citation("a"), citation("b")]);

        let state = viewer.store().snapshot();
        assert_eq!(state.highlighted_citations().len(), 2);
        assert!(state.is_highlighted("b"));
    }

    #[test]
    fn page_is_never_below_one() {
        let viewer = DocumentViewer::default();
        viewer.set_page(0);
        assert_eq!(viewer.store().with(|s| s.current_page), 1);
    }

    #[test]
    fn unresolvable_citation_uses_fallback_url() {
        let viewer = DocumentViewer::new(Some("http://localhost:8000/documents/missing.pdf".into()));
        let unnamed = Citation::new("", "Untitled").with_id("u1");

        assert!(viewer.open_citation(&unnamed, &SlugResolver::new("http://localhost:8000")));
        let state = viewer.store().snapshot();
        assert_eq!(
            state.document_url.as_deref(),
            Some("http://localhost:8000/documents/missing.pdf")
        );
        assert!(state.is_highlighted("u1"));
    }

    #[test]
    fn unresolvable_citation_without_fallback_is_not_opened() {
        let viewer = DocumentViewer::default();
        let unnamed = Citation::new("", "Untitled");

        assert!(!viewer.open_citation(&unnamed, &SlugResolver::new("http://localhost:8000")));
        assert!(!viewer.store().with(|s| s.is_open));
    }
}
