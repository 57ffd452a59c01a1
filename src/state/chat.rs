use std::rc::Rc;

use futures::StreamExt;
use thiserror::Error;

use super::store::{Reducer, Store};
use crate::api::{ApiError, ChatBackend, ChatEvent, ChatRequest};
use crate::markdown::render_markdown;
use crate::types::{Category, ChatMessage, Citation};

pub const NO_ANSWER: &str = "No answer was returned for this question.";

#[derive(Debug, Error, PartialEq)]
pub enum SendError {
    #[error("cannot send an empty message")]
    EmptyPrompt,
    #[error("a response is still in progress")]
    Busy,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq)]
struct PendingResponse {
    generation: u64,
    /// Index of the assistant message being streamed into, once one exists.
    message: Option<usize>,
    failed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub is_typing: bool,
    pub status: Option<String>,
    pub last_error: Option<String>,
    pub category: Option<Category>,
    generation: u64,
    pending: Option<PendingResponse>,
}

#[derive(Debug)]
pub enum ChatAction {
    Submit(ChatMessage),
    Status { generation: u64, text: String },
    AppendChunk { generation: u64, chunk: String },
    AttachCitations { generation: u64, citations: Vec<Citation> },
    Fail { generation: u64, error: String },
    Finish { generation: u64 },
    SetCategory(Option<Category>),
    Clear,
}

impl ChatState {
    fn pending_for(&mut self, generation: u64) -> Option<&mut PendingResponse> {
        self.pending
            .as_mut()
            .filter(|pending| pending.generation == generation)
    }

    fn assistant_message(&mut self, generation: u64) -> Option<&mut ChatMessage> {
        let index = {
            let pending = self.pending_for(generation)?;
            pending.message
        };

        let index = match index {
            Some(index) => index,
            None => {
                self.messages.push(ChatMessage::assistant(String::new()));
                let index = self.messages.len() - 1;
                if let Some(pending) = self.pending_for(generation) {
                    pending.message = Some(index);
                }
                index
            }
        };
        self.messages.get_mut(index)
    }
}

impl Reducer for ChatState {
    type Action = ChatAction;

    fn reduce(&mut self, action: ChatAction) {
        match action {
            ChatAction::Submit(message) => {
                self.generation += 1;
                self.messages.push(message);
                self.is_typing = true;
                self.status = None;
                self.last_error = None;
                self.pending = Some(PendingResponse {
                    generation: self.generation,
                    message: None,
                    failed: false,
                });
            }
            ChatAction::Status { generation, text } => {
                if self.pending_for(generation).is_some() {
                    self.status = Some(text).filter(|t| !t.is_empty());
                }
            }
            ChatAction::AppendChunk { generation, chunk } => {
                if let Some(message) = self.assistant_message(generation) {
                    message.content.push_str(&chunk);
                }
            }
            ChatAction::AttachCitations {
                generation,
                citations,
            } => {
                if let Some(message) = self.assistant_message(generation) {
                    for citation in citations {
                        if !message.citations.iter().any(|c| c.id == citation.id) {
                            message.citations.push(citation);
                        }
                    }
                }
            }
            ChatAction::Fail { generation, error } => {
                let Some(pending) = self.pending_for(generation) else {
                    log::debug!("dropping failure from stale request {}", generation);
                    return;
                };
                pending.failed = true;
                let streamed = pending.message;

                match streamed.and_then(|index| self.messages.get_mut(index)) {
                    Some(message) => message.is_error = true,
                    None => {
                        let mut message = ChatMessage::assistant(format!(
                            "Sorry, I encountered an error: {}",
                            error
                        ));
                        message.is_error = true;
                        self.messages.push(message);
                    }
                }
                self.last_error = Some(error);
            }
            ChatAction::Finish { generation } => {
                let Some(pending) = self.pending_for(generation).cloned() else {
                    return;
                };

                match pending.message.and_then(|index| self.messages.get_mut(index)) {
                    Some(message) => {
                        message.answer_html = Some(render_markdown(&message.content));
                    }
                    None if !pending.failed => {
                        let mut message = ChatMessage::assistant(NO_ANSWER);
                        message.answer_html = Some(render_markdown(NO_ANSWER));
                        self.messages.push(message);
                    }
                    None => {}
                }

                self.pending = None;
                self.is_typing = false;
                self.status = None;
            }
            ChatAction::SetCategory(category) => self.category = category,
            ChatAction::Clear => {
                // bumping the generation orphans any in-flight response
                self.generation += 1;
                self.messages.clear();
                self.pending = None;
                self.is_typing = false;
                self.status = None;
                self.last_error = None;
            }
        }
    }
}

/// Clears the typing flag for its request however `send_message` exits.
struct TypingGuard {
    store: Store<ChatState>,
    generation: u64,
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.store.dispatch(ChatAction::Finish {
            generation: self.generation,
        });
    }
}

pub struct ChatController<B> {
    store: Store<ChatState>,
    backend: Rc<B>,
}

impl<B> Clone for ChatController<B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            backend: Rc::clone(&self.backend),
        }
    }
}

impl<B: ChatBackend> ChatController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            store: Store::default(),
            backend: Rc::new(backend),
        }
    }

    pub fn store(&self) -> &Store<ChatState> {
        &self.store
    }

    pub fn state(&self) -> ChatState {
        self.store.snapshot()
    }

    pub fn set_category(&self, category: Option<Category>) {
        self.store.dispatch(ChatAction::SetCategory(category));
    }

    pub fn clear(&self) {
        self.store.dispatch(ChatAction::Clear);
    }

    pub async fn send_message(&self, text: &str) -> Result<(), SendError> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(SendError::EmptyPrompt);
        }
        if self.store.with(|state| state.is_typing) {
            log::warn!("ignoring send while a response is in progress");
            return Err(SendError::Busy);
        }

        let request = self.store.with(|state| {
            ChatRequest::new(prompt.to_string(), state.category, &state.messages)
        });

        // the user turn lands before any network activity
        self.store.dispatch(ChatAction::Submit(ChatMessage::user(prompt)));
        let generation = self.store.with(|state| state.generation);
        let _typing = TypingGuard {
            store: self.store.clone(),
            generation,
        };

        match self.stream_response(request, generation).await {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("chat request failed: {}", e);
                self.store.dispatch(ChatAction::Fail {
                    generation,
                    error: e.to_string(),
                });
                Err(SendError::Api(e))
            }
        }
    }

    async fn stream_response(&self, request: ChatRequest, generation: u64) -> Result<(), ApiError> {
        let mut events = self.backend.send_chat(request).await?;

        while let Some(event) = events.next().await {
            match event? {
                ChatEvent::Token(chunk) => {
                    self.store
                        .dispatch(ChatAction::AppendChunk { generation, chunk });
                }
                ChatEvent::Citations(citations) => {
                    self.store.dispatch(ChatAction::AttachCitations {
                        generation,
                        citations,
                    });
                }
                ChatEvent::Status(text) => {
                    self.store.dispatch(ChatAction::Status { generation, text });
                }
                ChatEvent::Error(message) => return Err(ApiError::Server(message)),
                ChatEvent::Done => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatStream;
    use crate::types::Role;
    use futures::channel::oneshot;
    use futures::stream;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct MockBackend {
        events: Vec<Result<ChatEvent, ApiError>>,
        refuse: Option<ApiError>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
        calls: Cell<usize>,
        requests: RefCell<Vec<ChatRequest>>,
    }

    impl MockBackend {
        fn answering(chunks: &[&str]) -> Self {
            let mut events: Vec<_> = chunks
                .iter()
                .map(|c| Ok(ChatEvent::Token(c.to_string())))
                .collect();
            events.push(Ok(ChatEvent::Done));
            Self {
                events,
                ..Default::default()
            }
        }
    }

    impl ChatBackend for MockBackend {
        async fn send_chat(&self, request: ChatRequest) -> Result<ChatStream, ApiError> {
            self.calls.set(self.calls.get() + 1);
            self.requests.borrow_mut().push(request);

            let gate = self.gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if let Some(e) = self.refuse.clone() {
                return Err(e);
            }
            Ok(stream::iter(self.events.clone()).boxed_local())
        }
    }

    #[tokio::test]
    async fn whitespace_prompt_is_rejected_without_side_effects() {
        let controller = ChatController::new(MockBackend::answering(&["hi"]));

        let result = controller.send_message("   \n\t").await;

        assert_eq!(result, Err(SendError::EmptyPrompt));
        assert!(controller.store().with(|s| s.messages.is_empty()));
        assert_eq!(controller.backend.calls.get(), 0);
    }

    #[tokio::test]
    async fn successful_send_appends_user_then_assistant() {
        let controller = ChatController::new(MockBackend::answering(&["Hel", "lo ", "**there**"]));

        controller.send_message("  hi ").await.unwrap();

        let state = controller.store().snapshot();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].role, Role::User);
        assert_eq!(state.messages[0].content, "hi");
        assert_eq!(state.messages[1].role, Role::Assistant);
        assert_eq!(state.messages[1].content, "Hello **there**");
        assert!(state.messages[1]
            .answer_html
            .as_deref()
            .unwrap()
            .contains("<strong>there</strong>"));
        assert!(!state.is_typing);
    }

    #[tokio::test]
    async fn typing_flag_is_set_while_waiting() {
        let (release, gate) = oneshot::channel();
        let backend = MockBackend::answering(&["ok"]);
        *backend.gate.borrow_mut() = Some(gate);
        let controller = ChatController::new(backend);

        let observed = Rc::new(Cell::new(false));
        let seen = Rc::clone(&observed);
        let watcher = controller.clone();
        let check = async move {
            seen.set(watcher.store().with(|s| s.is_typing && s.messages.len() == 1));
            let _ = release.send(());
        };

        let (result, _) = futures::join!(controller.send_message("question"), check);

        assert!(result.is_ok());
        assert!(observed.get());
        assert!(!controller.store().with(|s| s.is_typing));
    }

    #[tokio::test]
    async fn network_failure_becomes_terminal_message_and_clears_typing() {
        let backend = MockBackend {
            refuse: Some(ApiError::Network("connection refused".into())),
            ..Default::default()
        };
        let controller = ChatController::new(backend);

        let result = controller.send_message("anyone there?").await;

        assert!(matches!(result, Err(SendError::Api(ApiError::Network(_)))));
        let state = controller.store().snapshot();
        assert_eq!(state.messages.len(), 2);
        assert!(state.messages[1].is_error);
        assert!(state.messages[1].content.starts_with("Sorry, I encountered an error"));
        assert!(state.last_error.is_some());
        assert!(!state.is_typing);
    }

    #[tokio::test]
    async fn malformed_body_becomes_terminal_error_message() {
        let backend = MockBackend {
            refuse: Some(ApiError::Decode("chat response has no answer, chunks or citations".into())),
            ..Default::default()
        };
        let controller = ChatController::new(backend);

        let result = controller.send_message("q").await;

        assert!(matches!(result, Err(SendError::Api(ApiError::Decode(_)))));
        let state = controller.store().snapshot();
        assert_eq!(state.messages.len(), 2);
        assert!(state.messages[1].is_error);
        assert!(state.messages.iter().all(|m| m.content != NO_ANSWER));
        assert!(!state.is_typing);
    }

    #[tokio::test]
    async fn mid_stream_error_marks_partial_answer() {
        let backend = MockBackend {
            events: vec![
                Ok(ChatEvent::Token("The answer is".into())),
                Ok(ChatEvent::Error("model overloaded".into())),
            ],
            ..Default::default()
        };
        let controller = ChatController::new(backend);

        let result = controller.send_message("q").await;

        assert_eq!(
            result,
            Err(SendError::Api(ApiError::Server("model overloaded".into())))
        );
        let state = controller.store().snapshot();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].content, "The answer is");
        assert!(state.messages[1].is_error);
        assert_eq!(state.last_error.as_deref(), Some("model overloaded"));
    }

    #[tokio::test]
    async fn second_send_while_busy_is_rejected() {
        let (release, gate) = oneshot::channel();
        let backend = MockBackend::answering(&["first answer"]);
        *backend.gate.borrow_mut() = Some(gate);
        let controller = ChatController::new(backend);

        let other = controller.clone();
        let second = async move {
            let result = other.send_message("second").await;
            let _ = release.send(());
            result
        };

        let (first, second) = futures::join!(controller.send_message("first"), second);

        assert!(first.is_ok());
        assert_eq!(second, Err(SendError::Busy));
        assert_eq!(controller.backend.calls.get(), 1);
        assert_eq!(controller.store().with(|s| s.messages.len()), 2);
    }

    #[tokio::test]
    async fn response_arriving_after_clear_is_discarded() {
        let (release, gate) = oneshot::channel();
        let backend = MockBackend::answering(&["stale"]);
        *backend.gate.borrow_mut() = Some(gate);
        let controller = ChatController::new(backend);

        let other = controller.clone();
        let clear = async move {
            other.clear();
            let _ = release.send(());
        };

        let (result, _) = futures::join!(controller.send_message("old question"), clear);

        assert!(result.is_ok());
        let state = controller.store().snapshot();
        assert!(state.messages.is_empty());
        assert!(!state.is_typing);
    }

    #[tokio::test]
    async fn citations_attach_to_the_streamed_answer_without_duplicates() {
        let citation = Citation::new("Bylaws", "Bylaws 2021").with_id("c1");
        let backend = MockBackend {
            events: vec![
                Ok(ChatEvent::Citations(vec![citation.clone()])),
                Ok(ChatEvent::Token("See the bylaws.".into())),
                Ok(ChatEvent::Citations(vec![citation])),
                Ok(ChatEvent::Done),
            ],
            ..Default::default()
        };
        let controller = ChatController::new(backend);

        controller.send_message("what governs elections?").await.unwrap();

        let state = controller.store().snapshot();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].citations.len(), 1);
    }

    #[tokio::test]
    async fn empty_response_still_produces_one_answer() {
        let controller = ChatController::new(MockBackend::answering(&[]));

        controller.send_message("hello?").await.unwrap();

        let state = controller.store().snapshot();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].content, NO_ANSWER);
    }

    #[tokio::test]
    async fn request_carries_history_and_category() {
        let controller = ChatController::new(MockBackend::answering(&["a"]));
        controller.set_category(Some(Category::Resolutions));

        controller.send_message("one").await.unwrap();
        controller.send_message("two").await.unwrap();

        let requests = controller.backend.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].question, "two");
        assert_eq!(requests[1].history.len(), 2);
        assert_eq!(requests[1].category, Some(Category::Resolutions));
    }
}
