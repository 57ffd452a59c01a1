use chrono::{DateTime, Utc};

use crate::types::{ChatMessage, Role};

/// A question with the answer(s) that followed it, as shown in the history
/// drawer. Always derived from the message list, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationGroup {
    pub date: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
    pub question_count: usize,
    pub citation_count: usize,
}

impl ConversationGroup {
    fn from_messages(messages: Vec<ChatMessage>) -> Option<Self> {
        let date = messages.last()?.created_at;
        let question_count = messages.iter().filter(|m| m.role == Role::User).count();
        let citation_count = messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.citations.len())
            .sum();

        Some(Self {
            date,
            messages,
            question_count,
            citation_count,
        })
    }

    /// First question of the group, or the first answer for a group that
    /// has no question.
    pub fn preview(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .or_else(|| self.messages.first())
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    fn matches(&self, needle: &str) -> bool {
        self.messages.iter().any(|message| {
            contains_ci(&message.content, needle)
                || message
                    .answer_html
                    .as_deref()
                    .is_some_and(|html| contains_ci(html, needle))
                || message.citations.iter().any(|citation| {
                    contains_ci(&citation.title, needle)
                        || citation
                            .quote
                            .as_deref()
                            .is_some_and(|quote| contains_ci(quote, needle))
                })
        })
    }
}

/// Groups messages into question/answer runs, most recent first.
///
/// A group closes on an assistant message that is either the last message or
/// followed by a user message. Trailing messages that have not been answered
/// yet do not form a group.
pub fn group_conversations(messages: &[ChatMessage]) -> Vec<ConversationGroup> {
    let mut groups = Vec::new();
    let mut current: Vec<ChatMessage> = Vec::new();

    for (index, message) in messages.iter().enumerate() {
        current.push(message.clone());

        let closes = message.role == Role::Assistant
            && messages
                .get(index + 1)
                .map_or(true, |next| next.role == Role::User);

        if closes {
            groups.extend(ConversationGroup::from_messages(std::mem::take(&mut current)));
        }
    }

    groups.reverse();
    groups
}

/// Case-insensitive substring filter over message text, rendered answers and
/// citation titles/quotes. A blank query keeps every group.
pub fn filter_groups(groups: &[ConversationGroup], query: &str) -> Vec<ConversationGroup> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return groups.to_vec();
    }

    groups
        .iter()
        .filter(|group| group.matches(&needle))
        .cloned()
        .collect()
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
