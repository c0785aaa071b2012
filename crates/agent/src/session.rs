//! Per-conversation state.

use crate::retrieval::SearchSource;
use crate::types::{MemberContext, Message, RetrievedContext, Role};
use assist_core::{AppError, AppResult};
use std::collections::HashMap;
use uuid::Uuid;

/// State of one chat with one caller.
///
/// Messages are append-only until [`ChatSession::reset`] or a new member is
/// selected.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    messages: Vec<Message>,
    member: Option<MemberContext>,
    restricted: bool,
    suggestions: Vec<String>,
    memo: HashMap<(SearchSource, String), RetrievedContext>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            member: None,
            restricted: false,
            suggestions: Vec::new(),
            memo: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// The last `window` messages, or nothing when history is disabled.
    pub fn history_window(&self, window: usize, enabled: bool) -> &[Message] {
        if !enabled {
            return &[];
        }
        let start = self.messages.len().saturating_sub(window);
        &self.messages[start..]
    }

    /// Start over: forget messages, member, suggestions and cached retrievals.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.member = None;
        self.restricted = false;
        self.suggestions.clear();
        self.memo.clear();
        tracing::debug!("Session {} reset", self.id);
    }

    pub fn member(&self) -> Option<&MemberContext> {
        self.member.as_ref()
    }

    /// Switch to another caller. Clears the conversation and lifts the
    /// member restriction.
    pub fn select_member(&mut self, member: Option<MemberContext>) {
        self.messages.clear();
        self.suggestions.clear();
        self.restricted = false;
        self.member = member;
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    pub fn set_restricted(&mut self, restricted: bool) -> AppResult<()> {
        if restricted && self.member.is_none() {
            return Err(AppError::Session(
                "Select a member before restricting the conversation".to_string(),
            ));
        }
        self.restricted = restricted;
        Ok(())
    }

    /// Sentence pinning the conversation to the selected member, or empty.
    pub fn restriction_prompt(&self) -> String {
        match (&self.member, self.restricted) {
            (Some(member), true) => {
                format!("This request is related to the member name {}", member.name)
            }
            _ => String::new(),
        }
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }

    /// Suggestion by zero-based index.
    pub fn suggestion(&self, index: usize) -> AppResult<String> {
        self.suggestions.get(index).cloned().ok_or_else(|| {
            AppError::Session(format!(
                "No suggestion {} (have {})",
                index + 1,
                self.suggestions.len()
            ))
        })
    }

    pub(crate) fn cached_context(&self, source: SearchSource, question: &str) -> Option<&RetrievedContext> {
        self.memo.get(&(source, question.to_string()))
    }

    pub(crate) fn cache_context(&mut self, source: SearchSource, question: &str, context: RetrievedContext) {
        self.memo.insert((source, question.to_string()), context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> MemberContext {
        MemberContext {
            phone: "946-081-0513".to_string(),
            member_id: "M100".to_string(),
            name: "Jessica Mills".to_string(),
            caller_intent: "Wellness".to_string(),
            additional_info: String::new(),
        }
    }

    #[test]
    fn test_history_window() {
        let mut session = ChatSession::new();
        for i in 0..5 {
            session.push(Role::User, format!("q{}", i));
        }

        let window = session.history_window(3, true);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].content, "q2");
        assert_eq!(session.history_window(10, true).len(), 5);
        assert!(session.history_window(3, false).is_empty());
    }

    #[test]
    fn test_empty_history_window() {
        let session = ChatSession::new();
        assert!(session.history_window(3, true).is_empty());
    }

    #[test]
    fn test_restriction_prompt() {
        let mut session = ChatSession::new();
        assert!(session.set_restricted(true).is_err());
        assert_eq!(session.restriction_prompt(), "");

        session.select_member(Some(member()));
        assert_eq!(session.restriction_prompt(), "");

        session.set_restricted(true).unwrap();
        assert_eq!(
            session.restriction_prompt(),
            "This request is related to the member name Jessica Mills"
        );

        session.set_restricted(false).unwrap();
        assert_eq!(session.restriction_prompt(), "");
    }

    #[test]
    fn test_select_member_clears_conversation() {
        let mut session = ChatSession::new();
        session.select_member(Some(member()));
        session.set_restricted(true).unwrap();
        session.push(Role::User, "hello");
        session.set_suggestions(vec!["a".to_string()]);

        session.select_member(Some(member()));
        assert!(session.messages().is_empty());
        assert!(session.suggestions().is_empty());
        assert!(!session.is_restricted());
        assert!(session.member().is_some());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = ChatSession::new();
        session.select_member(Some(member()));
        session.push(Role::User, "hello");
        session.cache_context(SearchSource::Faq, "q", RetrievedContext::default());

        session.reset();
        assert!(session.messages().is_empty());
        assert!(session.member().is_none());
        assert!(session.cached_context(SearchSource::Faq, "q").is_none());
    }

    #[test]
    fn test_suggestion_lookup() {
        let mut session = ChatSession::new();
        session.set_suggestions(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(session.suggestion(1).unwrap(), "second");
        assert!(session.suggestion(2).is_err());
    }
}
