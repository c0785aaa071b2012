//! Types shared by the chat pipeline.

use assist_platform::ResultSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Render messages the way they are embedded into prompts.
pub fn format_history(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Which agent answers a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Past call transcripts
    Recordings,
    /// Knowledge store documents
    Faq,
    /// Member data product
    Data,
}

impl Intent {
    /// Parse a configured or user-supplied intent name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "recordings" | "recording" => Some(Self::Recordings),
            "faq" => Some(Self::Faq),
            "data" => Some(Self::Data),
            _ => None,
        }
    }

    /// Map a classification label to an intent.
    ///
    /// Anything that is not recognizably `Recordings` or `Data` is answered
    /// from the knowledge store.
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .trim()
            .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
            .to_lowercase();

        match normalized.as_str() {
            "recordings" => Self::Recordings,
            "data" => Self::Data,
            _ => Self::Faq,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recordings => "recordings",
            Self::Faq => "faq",
            Self::Data => "data",
        }
    }

    /// Display name of the agent handling this intent.
    pub fn agent_name(&self) -> &'static str {
        match self {
            Self::Recordings => "Call Recordings Search Agent",
            Self::Faq => "Knowledge Store Search Agent",
            Self::Data => "Contact Center Analyst Agent",
        }
    }

    /// Message shown when a question is routed to this intent's agent.
    pub fn routing_message(&self) -> String {
        match self {
            Self::Recordings => format!(
                "Based on the insights from Cortex AI, this seems to be a question related to call recordings.\nInitiating {}.",
                self.agent_name()
            ),
            Self::Faq => format!(
                "Based on the insights from Cortex AI, this seems to be a Contact Center Knowledge Store based question.\nInitiating {}.",
                self.agent_name()
            ),
            Self::Data => format!(
                "Based on the insights from Cortex AI, this question seems appropriate for the Contact Center Member 360 Data Product.\nInitiating {} to help answer this question.",
                self.agent_name()
            ),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller currently on the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberContext {
    pub phone: String,
    pub member_id: String,
    pub name: String,
    /// Predicted reason for the call
    pub caller_intent: String,
    /// Extra retrieval hint derived from the caller intent
    pub additional_info: String,
}

impl MemberContext {
    /// Question pre-filled into the chat after selecting the member.
    pub fn initial_chat_string(&self) -> String {
        format!(
            "Please share relevant information related to Member: {} on {}. {}",
            self.name, self.caller_intent, self.additional_info
        )
        .trim_end()
        .to_string()
    }
}

/// A cited source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Relative path on the stage, as displayed
    pub path: String,
    /// Time-limited download link
    pub url: String,
}

/// Context text plus the documents it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub context: String,
    pub documents: Vec<DocumentRef>,
}

/// An intermediate value surfaced in debug mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugNote {
    pub label: String,
    pub text: String,
}

impl DebugNote {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Answer {
    /// Question as typed
    pub question: String,
    /// Standalone query actually answered
    pub summary: String,
    /// Shown on follow-ups so the agent can correct a bad rewrite
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Routing message of the agent that answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
    pub text: String,
    pub documents: Vec<DocumentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_set: Option<ResultSet>,
    pub suggestions: Vec<String>,
    pub violation: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<DebugNote>,
}

impl Answer {
    pub fn new(question: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            summary: summary.into(),
            ..Self::default()
        }
    }
}

/// Recommended follow-up after a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextBestAction {
    pub text: String,
    /// False when no action could be determined
    pub actionable: bool,
}

/// Follow-up email produced from a next best action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftAction {
    pub subject: String,
    pub body: String,
}

impl DraftAction {
    /// Parse `Subject:` and `Body:` sections from a completion.
    ///
    /// Lines before the subject are ignored; everything after the `Body:`
    /// line is the body.
    pub fn parse(text: &str) -> Self {
        let mut subject = String::new();
        let mut body_lines: Vec<&str> = Vec::new();
        let mut in_body = false;

        for line in text.lines() {
            if in_body {
                body_lines.push(line);
                continue;
            }

            let trimmed = line.trim_start();
            if let Some(rest) = strip_label(trimmed, "Subject") {
                subject = rest.trim().to_string();
            } else if let Some(rest) = strip_label(trimmed, "Body") {
                in_body = true;
                if !rest.trim().is_empty() {
                    body_lines.push(rest.trim());
                }
            }
        }

        Self {
            subject,
            body: body_lines.join("\n").trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_empty() && self.body.is_empty()
    }
}

/// Strip `Label:` or `Label :` from the start of a line.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(label)?;
    rest.trim_start().strip_prefix(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_label() {
        assert_eq!(Intent::from_label("Recordings"), Intent::Recordings);
        assert_eq!(Intent::from_label("  data.\n"), Intent::Data);
        assert_eq!(Intent::from_label("'DATA'"), Intent::Data);
        assert_eq!(Intent::from_label("FAQ"), Intent::Faq);
        assert_eq!(Intent::from_label("I am not sure"), Intent::Faq);
        assert_eq!(Intent::from_label(""), Intent::Faq);
    }

    #[test]
    fn test_intent_parse() {
        assert_eq!(Intent::parse("Recordings"), Some(Intent::Recordings));
        assert_eq!(Intent::parse("faq"), Some(Intent::Faq));
        assert_eq!(Intent::parse("billing"), None);
    }

    #[test]
    fn test_routing_messages_name_agents() {
        assert!(Intent::Data
            .routing_message()
            .contains("Initiating Contact Center Analyst Agent"));
        assert!(Intent::Faq
            .routing_message()
            .ends_with("Initiating Knowledge Store Search Agent."));
    }

    #[test]
    fn test_format_history() {
        let messages = vec![
            Message::new(Role::User, "Hi"),
            Message::new(Role::Assistant, "Hello"),
        ];
        assert_eq!(format_history(&messages), "user: Hi\nassistant: Hello");
        assert_eq!(format_history(&[]), "");
    }

    #[test]
    fn test_initial_chat_string() {
        let member = MemberContext {
            phone: "946-081-0564".to_string(),
            member_id: "M1".to_string(),
            name: "Jane Doe".to_string(),
            caller_intent: "Inadequate Care".to_string(),
            additional_info: " Retrieve related provider details as well".to_string(),
        };
        assert_eq!(
            member.initial_chat_string(),
            "Please share relevant information related to Member: Jane Doe on Inadequate Care.  Retrieve related provider details as well"
        );

        let plain = MemberContext {
            additional_info: String::new(),
            ..member
        };
        assert!(plain.initial_chat_string().ends_with("on Inadequate Care."));
    }

    #[test]
    fn test_draft_parse() {
        let text = "Here is the email:\nSubject: 943130253 | Claim delay\nBody:\nDear Claim Ops,\n\nPlease expedite.\n\nEnterprise Nxt Call Center Ops\n";
        let draft = DraftAction::parse(text);
        assert_eq!(draft.subject, "943130253 | Claim delay");
        assert_eq!(
            draft.body,
            "Dear Claim Ops,\n\nPlease expedite.\n\nEnterprise Nxt Call Center Ops"
        );
    }

    #[test]
    fn test_draft_parse_spaced_labels_and_inline_body() {
        let draft = DraftAction::parse("Subject : Hello\nBody: Thanks for calling.\nBye");
        assert_eq!(draft.subject, "Hello");
        assert_eq!(draft.body, "Thanks for calling.\nBye");
    }

    #[test]
    fn test_draft_parse_without_labels() {
        let draft = DraftAction::parse("Unable to draft.");
        assert!(draft.is_empty());
    }
}
