//! The question-answering pipeline.
//!
//! One call to [`Assistant::ask`] runs the whole flow for a question:
//! rewrite it against recent history, pick the agent (by classification or
//! configuration), retrieve context and ask the completion service to answer.

use crate::member::{lookup_member, NO_MEMBER_FOUND};
use crate::retrieval::{self, SearchSource};
use crate::session::ChatSession;
use crate::types::{format_history, Answer, DebugNote, Intent, MemberContext, Message, RetrievedContext, Role};
use assist_core::config::SUPPORTED_MODELS;
use assist_core::{AppConfig, AppError, AppResult};
use assist_llm::{create_client, LlmClient, LlmRequest};
use assist_platform::PlatformClient;
use assist_prompt::{build_prompt, ids, load_prompt};
use std::collections::HashMap;
use std::sync::Arc;

/// Returned when the completion service answers with nothing.
pub const NO_RESPONSE: &str = "No response received from Cortex AI.";

const REFINE_NOISE: &str = "or supporting documentation";

/// Runs questions through retrieval and completion for a chat session.
pub struct Assistant {
    config: AppConfig,
    platform: PlatformClient,
    llm: Arc<dyn LlmClient>,
}

impl Assistant {
    pub fn new(config: AppConfig, platform: PlatformClient, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            config,
            platform,
            llm,
        }
    }

    /// Build the platform and completion clients from configuration.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let platform = PlatformClient::from_config(&config)?;
        let llm = create_client(&config.completion.mode, platform.clone())?;
        Ok(Self::new(config, platform, llm))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Pipeline switches can be flipped mid-session.
    pub fn chat_config_mut(&mut self) -> &mut assist_core::config::ChatConfig {
        &mut self.config.chat
    }

    pub fn platform(&self) -> &PlatformClient {
        &self.platform
    }

    pub fn provider_name(&self) -> &str {
        self.llm.provider_name()
    }

    pub fn set_model(&mut self, model: &str) -> AppResult<()> {
        if !SUPPORTED_MODELS.contains(&model) {
            return Err(AppError::Config(format!(
                "Unknown model: {}. Supported: {}",
                model,
                SUPPORTED_MODELS.join(", ")
            )));
        }
        self.config.completion.model = model.to_string();
        tracing::info!("Completion model set to {}", model);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: &str) -> AppResult<()> {
        self.llm = create_client(mode, self.platform.clone())?;
        self.config.completion.mode = mode.to_lowercase();
        tracing::info!("Completion mode set to {}", self.config.completion.mode);
        Ok(())
    }

    /// Look up the caller and make them the session's member.
    ///
    /// Returns the initial chat string, or [`NO_MEMBER_FOUND`] when the
    /// phone number matches nobody (the member is cleared in that case).
    pub async fn select_member(&self, session: &mut ChatSession, phone: &str) -> AppResult<String> {
        let member = lookup_member(&self.platform, &self.config.platform, phone).await?;
        let message = member
            .as_ref()
            .map(MemberContext::initial_chat_string)
            .unwrap_or_else(|| NO_MEMBER_FOUND.to_string());
        session.select_member(member);
        Ok(message)
    }

    /// Answer a question typed by the agent.
    pub async fn ask(&self, session: &mut ChatSession, question: &str) -> AppResult<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Session("Question is empty".to_string()));
        }

        let chat = &self.config.chat;
        let history = session
            .history_window(chat.slide_window, chat.use_chat_history)
            .to_vec();
        session.push(Role::User, question);

        let mut notes = Vec::new();
        let summary = if !history.is_empty() && chat.summarize_with_chat_history {
            self.refine_question(session, &history, question, &mut notes).await?
        } else {
            question.to_string()
        };

        let mut answer = Answer::new(question, summary.clone());
        if session.messages().len() > 1 {
            answer.interpretation = Some(interpretation_message(&summary));
        }

        let intent = if chat.classify_intent {
            if chat.check_violation && self.is_violation(session, &summary, &mut notes).await? {
                let text = violation_message(session.member());
                session.push(Role::Assistant, &text);
                answer.text = text;
                answer.violation = true;
                answer.notes = notes;
                return Ok(answer);
            }
            self.classify(session, &summary, &mut notes).await?
        } else {
            Intent::parse(&chat.default_intent).unwrap_or(Intent::Recordings)
        };

        answer.intent = Some(intent);
        answer.routing = Some(intent.routing_message());
        answer.notes = notes;
        tracing::info!("Routing question to {}", intent.agent_name());

        match intent {
            Intent::Data => self.answer_from_data(session, answer).await,
            Intent::Recordings => {
                self.answer_from_search(session, &history, SearchSource::Transcripts, answer)
                    .await
            }
            Intent::Faq => {
                self.answer_from_search(session, &history, SearchSource::Faq, answer)
                    .await
            }
        }
    }

    async fn refine_question(
        &self,
        session: &ChatSession,
        history: &[Message],
        question: &str,
        notes: &mut Vec<DebugNote>,
    ) -> AppResult<String> {
        let refined = self
            .complete(
                session,
                ids::QUESTION_REFINE,
                vars(&[("chatHistory", &format_history(history)), ("question", question)]),
                notes,
            )
            .await?;

        let refined = refined.replace(REFINE_NOISE, "").trim().to_string();
        if self.config.chat.debug {
            notes.push(DebugNote::new("Refined query", &refined));
        }

        if refined.is_empty() {
            Ok(question.to_string())
        } else {
            Ok(refined)
        }
    }

    async fn classify(
        &self,
        session: &ChatSession,
        summary: &str,
        notes: &mut Vec<DebugNote>,
    ) -> AppResult<Intent> {
        let label = self
            .complete(session, ids::INTENT_CLASSIFY, vars(&[("question", summary)]), notes)
            .await?;
        let intent = Intent::from_label(&label);
        if self.config.chat.debug {
            notes.push(DebugNote::new("Intent", format!("{} ({})", intent, label.trim())));
        }
        Ok(intent)
    }

    /// Only restricted sessions with a member are checked.
    async fn is_violation(
        &self,
        session: &ChatSession,
        summary: &str,
        notes: &mut Vec<DebugNote>,
    ) -> AppResult<bool> {
        let member = match session.member() {
            Some(member) if session.is_restricted() => member,
            _ => return Ok(false),
        };

        let verdict = self
            .complete(
                session,
                ids::POLICY_VIOLATION,
                vars(&[
                    ("memberName", &member.name),
                    ("memberId", &member.member_id),
                    ("question", summary),
                ]),
                notes,
            )
            .await?;

        let violation = verdict
            .trim()
            .trim_matches(|c: char| c.is_ascii_punctuation())
            .eq_ignore_ascii_case("yes");
        if violation {
            tracing::warn!("Question about another member in restricted session {}", session.id());
        }
        Ok(violation)
    }

    async fn answer_from_search(
        &self,
        session: &mut ChatSession,
        history: &[Message],
        source: SearchSource,
        mut answer: Answer,
    ) -> AppResult<Answer> {
        let query = restricted_query(&answer.summary, &session.restriction_prompt());

        let retrieved = if self.config.chat.cortex_search {
            self.retrieve(session, source, &query).await?
        } else {
            RetrievedContext::default()
        };

        let mut notes = std::mem::take(&mut answer.notes);
        let text = self
            .complete(
                session,
                ids::ANSWER_CONTEXT,
                vars(&[
                    ("context", &retrieved.context),
                    ("chatHistory", &format_history(history)),
                    ("question", &query),
                ]),
                &mut notes,
            )
            .await?;

        answer.text = if text.trim().is_empty() {
            NO_RESPONSE.to_string()
        } else {
            text.trim().to_string()
        };
        answer.documents = retrieved.documents;
        answer.notes = notes;

        session.push(Role::Assistant, &answer.text);
        Ok(answer)
    }

    /// Search once per (source, question) within a session.
    async fn retrieve(
        &self,
        session: &mut ChatSession,
        source: SearchSource,
        query: &str,
    ) -> AppResult<RetrievedContext> {
        if let Some(cached) = session.cached_context(source, query) {
            tracing::debug!("Reusing retrieval for {:?}", source);
            return Ok(cached.clone());
        }

        let retrieved = retrieval::retrieve(
            &self.platform,
            &self.config.search,
            &self.config.stage_ref(),
            source,
            query,
        )
        .await?;
        session.cache_context(source, query, retrieved.clone());
        Ok(retrieved)
    }

    /// Render a prompt, append the member restriction and run a completion.
    pub(crate) async fn complete(
        &self,
        session: &ChatSession,
        prompt_id: &str,
        variables: HashMap<String, String>,
        notes: &mut Vec<DebugNote>,
    ) -> AppResult<String> {
        let definition = load_prompt(&self.config.workspace, prompt_id)?;
        let built = build_prompt(&definition, variables)?;
        let prompt = restricted_prompt(&built.text, &session.restriction_prompt());

        if self.config.chat.show_prompt {
            notes.push(DebugNote::new(format!("Prompt {}", prompt_id), &prompt));
        }

        let request = LlmRequest::new(prompt, &self.config.completion.model);
        let response = self.llm.complete(&request).await?;
        tracing::debug!(
            "{} completed with {} ({} tokens)",
            prompt_id,
            response.model,
            response.usage.total_tokens
        );
        Ok(response.content)
    }
}

/// Build a prompt variable map from pairs.
pub(crate) fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Search and analyst question carrying the member restriction.
pub fn restricted_query(summary: &str, restriction: &str) -> String {
    if restriction.is_empty() {
        summary.to_string()
    } else {
        format!("{} . {}", summary, restriction)
    }
}

/// Completion prompt carrying the member restriction.
pub fn restricted_prompt(prompt: &str, restriction: &str) -> String {
    if restriction.is_empty() {
        prompt.to_string()
    } else {
        format!("{}\n.{}", prompt.trim_end(), restriction)
    }
}

fn interpretation_message(summary: &str) -> String {
    format!(
        "By evaluating the question and the chat history, Cortex AI is interpreting the question as below\n\n  '{}'\n\nPlease 'start over' or refine the question if this interpretation is inaccurate.",
        summary
    )
}

fn violation_message(member: Option<&MemberContext>) -> String {
    let selected = member
        .map(|m| format!("{} | {}", m.member_id, m.name))
        .unwrap_or_default();
    format!(
        "Identified a security violation. Please ensure your question is related to the selected member {}. Please refine the question.",
        selected
    )
}
