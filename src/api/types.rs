use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::types::{Category, ChatMessage, Citation, DocumentInfo, Role};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

impl ChatRequest {
    /// Builds a request from the conversation so far. Failed turns are left
    /// out of the context sent to the backend.
    pub fn new(question: String, category: Option<Category>, prior: &[ChatMessage]) -> Self {
        let history = prior
            .iter()
            .filter(|m| !m.is_error)
            .map(|m| HistoryTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();

        Self {
            question,
            category,
            history,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Status(String),
    Token(String),
    Citations(Vec<Citation>),
    Error(String),
    Done,
}

/// One line of a streamed chat response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatStreamEvent {
    pub message_type: String, // "content", "citations", "status", "error", "done"
    pub content: Option<String>,
    pub citations: Option<Vec<Citation>>,
}

impl ChatStreamEvent {
    /// Maps the wire event to a chat event; unknown types yield `None`.
    pub fn into_event(self) -> Option<ChatEvent> {
        let event = match self.message_type.as_str() {
            "content" => ChatEvent::Token(self.content.unwrap_or_default()),
            "citations" => ChatEvent::Citations(self.citations.unwrap_or_default()),
            "status" => ChatEvent::Status(self.content.unwrap_or_default()),
            "error" => ChatEvent::Error(
                self.content
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
            "done" => ChatEvent::Done,
            other => {
                log::debug!("ignoring chat event of type {}", other);
                return None;
            }
        };
        Some(event)
    }
}

/// Non-streaming chat response: either pre-split token chunks or a single answer.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub chunks: Option<Vec<String>>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl ChatBody {
    /// Fails when the body carries neither an answer, chunks nor citations,
    /// i.e. it is not a chat response at all.
    pub fn into_events(self) -> Result<Vec<ChatEvent>, ApiError> {
        if self.chunks.is_none() && self.answer.is_none() && self.citations.is_empty() {
            return Err(ApiError::Decode(
                "chat response has no answer, chunks or citations".to_string(),
            ));
        }

        let mut events = Vec::new();
        if !self.citations.is_empty() {
            events.push(ChatEvent::Citations(self.citations));
        }
        match (self.chunks, self.answer) {
            (Some(chunks), _) => events.extend(chunks.into_iter().map(ChatEvent::Token)),
            (None, Some(answer)) => events.push(ChatEvent::Token(answer)),
            (None, None) => {}
        }
        events.push(ChatEvent::Done);
        Ok(events)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub docs: Vec<DocumentInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DocumentList {
    Bare(Vec<DocumentInfo>),
    Wrapped { docs: Vec<DocumentInfo> },
}

impl DocumentList {
    pub fn into_vec(self) -> Vec<DocumentInfo> {
        match self {
            DocumentList::Bare(docs) | DocumentList::Wrapped { docs } => docs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_skips_failed_turns() {
        let mut failed = ChatMessage::assistant("Sorry, something broke");
        failed.is_error = true;
        let prior = vec![ChatMessage::user("first"), failed];

        let request = ChatRequest::new("second".into(), None, &prior);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(request.history.len(), 1);
        assert_eq!(json["history"][0]["role"], "user");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn category_is_sent_with_backend_name() {
        let request = ChatRequest::new("q".into(), Some(Category::Resolutions), &[]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["category"], "Resolutions");
    }

    #[test]
    fn answer_body_becomes_single_token() {
        let body: ChatBody = serde_json::from_str(
            r#"{"answer": "The bylaws say so.", "citations": [{"document": {"title": "Bylaws"}}]}"#,
        )
        .unwrap();
        let events = body.into_events().unwrap();

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], ChatEvent::Citations(c) if c.len() == 1));
        assert_eq!(events[1], ChatEvent::Token("The bylaws say so.".into()));
        assert_eq!(events[2], ChatEvent::Done);
    }

    #[test]
    fn body_without_answer_is_a_decode_error() {
        let body: ChatBody = serde_json::from_str(r#"{"detail": "unexpected shape"}"#).unwrap();
        assert!(matches!(body.into_events(), Err(ApiError::Decode(_))));

        let empty_chunks: ChatBody = serde_json::from_str(r#"{"chunks": []}"#).unwrap();
        assert_eq!(empty_chunks.into_events(), Ok(vec![ChatEvent::Done]));
    }

    #[test]
    fn unknown_stream_event_is_skipped() {
        let event: ChatStreamEvent =
            serde_json::from_str(r#"{"message_type": "heartbeat"}"#).unwrap();
        assert_eq!(event.into_event(), None);

        let status: ChatStreamEvent =
            serde_json::from_str(r#"{"message_type": "status", "content": "Searching"}"#).unwrap();
        assert_eq!(status.into_event(), Some(ChatEvent::Status("Searching".into())));
    }

    #[test]
    fn document_list_accepts_both_shapes() {
        let bare: DocumentList =
            serde_json::from_str(r#"[{"id": "1", "name": "a.pdf"}]"#).unwrap();
        let wrapped: DocumentList =
            serde_json::from_str(r#"{"docs": [{"id": "1", "name": "a.pdf"}]}"#).unwrap();

        assert_eq!(bare.into_vec().len(), 1);
        assert_eq!(wrapped.into_vec()[0].name, "a.pdf");
    }

    #[test]
    fn upload_file_extension_is_lowercased() {
        assert_eq!(UploadFile::new("Minutes.PDF", vec![]).extension().as_deref(), Some("pdf"));
        assert_eq!(UploadFile::new("README", vec![]).extension(), None);
    }
}
