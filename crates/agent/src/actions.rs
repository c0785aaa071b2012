//! Follow-up actions after a call: next best action, email draft and send.

use crate::assistant::{vars, Assistant};
use crate::session::ChatSession;
use crate::types::{format_history, DraftAction, NextBestAction};
use assist_core::{AppError, AppResult};
use assist_platform::Binding;
use assist_prompt::ids;

pub const NO_ACTION: &str = "Unable to determine next best action with information available.";
pub const ACTION_ERROR: &str = "Unable to determine next best action due to an internal error.";

const NO_ACTION_PREFIX: &str = "Unable to determine next best action";

impl Assistant {
    fn action_history(&self, session: &ChatSession) -> String {
        let chat = &self.config().chat;
        format_history(session.history_window(chat.slide_window, chat.use_chat_history))
    }

    fn member_fields(session: &ChatSession) -> (String, String) {
        session
            .member()
            .map(|m| (m.name.clone(), m.member_id.clone()))
            .unwrap_or_else(|| ("the member".to_string(), String::new()))
    }

    /// Recommend what to do after the conversation so far.
    ///
    /// Never fails: completion errors become [`ACTION_ERROR`].
    pub async fn next_best_action(&self, session: &ChatSession) -> NextBestAction {
        let (name, _) = Self::member_fields(session);
        let history = self.action_history(session);
        let mut notes = Vec::new();

        let result = self
            .complete(
                session,
                ids::ACTION_NEXT,
                vars(&[("chatHistory", &history), ("memberName", &name)]),
                &mut notes,
            )
            .await;

        let text = match result {
            Ok(text) if text.trim().is_empty() => NO_ACTION.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::error!("Next best action failed: {}", e);
                ACTION_ERROR.to_string()
            }
        };

        NextBestAction {
            actionable: !text.starts_with(NO_ACTION_PREFIX)
                && !text.starts_with(&format!("- {}", NO_ACTION_PREFIX)),
            text,
        }
    }

    /// Draft the follow-up email for a next best action.
    ///
    /// Returns `None` when the completion is empty or has no subject/body.
    pub async fn draft_action(
        &self,
        session: &ChatSession,
        next_best_action: &str,
    ) -> AppResult<Option<DraftAction>> {
        let (name, member_id) = Self::member_fields(session);
        let history = self.action_history(session);
        let mut notes = Vec::new();

        let text = self
            .complete(
                session,
                ids::ACTION_DRAFT,
                vars(&[
                    ("chatHistory", &history),
                    ("nextBestAction", next_best_action),
                    ("memberName", &name),
                    ("memberId", &member_id),
                ]),
                &mut notes,
            )
            .await?;

        let draft = DraftAction::parse(&text);
        if draft.is_empty() {
            tracing::warn!("Draft completion had no Subject/Body sections");
            return Ok(None);
        }
        Ok(Some(draft))
    }

    /// Send a draft through the configured notification integration.
    pub async fn send_email(&self, recipient: &str, draft: &DraftAction) -> AppResult<()> {
        let recipient = recipient.trim();
        if recipient.is_empty() || !recipient.contains('@') {
            return Err(AppError::Session(
                "Please provide a valid recipient email address.".to_string(),
            ));
        }
        if draft.subject.trim().is_empty() {
            return Err(AppError::Session("Email subject is empty".to_string()));
        }

        self.platform()
            .execute(
                &send_email_sql(&self.config().email.integration),
                &[
                    Binding::text(recipient),
                    Binding::text(&draft.subject),
                    Binding::text(&draft.body),
                ],
            )
            .await?;

        tracing::info!("Sent follow-up email to {}", recipient);
        Ok(())
    }
}

/// Email statement; recipient, subject and body are bound.
pub fn send_email_sql(integration: &str) -> String {
    format!("CALL SYSTEM$SEND_EMAIL('{}', ?, ?, ?)", integration)
}
