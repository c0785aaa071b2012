//! Answers from the member data product via Cortex Analyst.

use crate::assistant::{restricted_query, vars, Assistant};
use crate::session::ChatSession;
use crate::types::{Answer, Intent, Role};
use assist_core::{AppError, AppResult};
use assist_platform::AnalystContent;
use assist_prompt::ids;

/// Answer used when the analyst returns nothing usable.
pub const REFINE_QUESTION: &str = "Please refine that question";

/// Boilerplate the summarizer adds when the data has no document links.
const NO_SUPPORTING_DOCS: &str =
    "There is no information available regarding any relevant supporting documentation.";

impl Assistant {
    /// Path of the semantic model on the stage.
    pub fn semantic_model_ref(&self) -> String {
        format!(
            "{}/{}",
            self.config().stage_ref(),
            self.config().platform.semantic_model_file
        )
    }

    /// Run the data path for the question in `answer`.
    ///
    /// Text blocks become the answer, suggestion blocks are stored on the
    /// session for `run_suggestion`, and SQL blocks are executed and
    /// summarized.
    pub(crate) async fn answer_from_data(
        &self,
        session: &mut ChatSession,
        mut answer: Answer,
    ) -> AppResult<Answer> {
        let question = restricted_query(&answer.summary, &session.restriction_prompt());
        let response = self
            .platform()
            .analyst_message(&question, &self.semantic_model_ref())
            .await?;

        let mut text = REFINE_QUESTION.to_string();
        let mut notes = std::mem::take(&mut answer.notes);

        for content in response.message.content {
            match content {
                AnalystContent::Text { text: interpretation } => {
                    text = interpretation;
                }
                AnalystContent::Suggestions { suggestions } => {
                    text = String::new();
                    answer.suggestions = suggestions.clone();
                    session.set_suggestions(suggestions);
                }
                AnalystContent::Sql { statement } => {
                    tracing::debug!("Analyst SQL: {}", statement);
                    let rows = self.platform().execute(&statement, &[]).await?;
                    text = self
                        .complete(
                            session,
                            ids::ANALYST_SUMMARIZE,
                            vars(&[
                                ("question", &answer.summary),
                                ("sql", &statement),
                                ("resultSet", &rows.to_table_string()),
                            ]),
                            &mut notes,
                        )
                        .await?;
                    answer.sql = Some(statement);
                    answer.result_set = Some(rows);
                }
                AnalystContent::Unknown => {}
            }
        }

        answer.text = text.replace(NO_SUPPORTING_DOCS, "").trim().to_string();
        answer.notes = notes;

        session.push(Role::Assistant, &answer.text);
        Ok(answer)
    }

    /// Ask one of the analyst's suggested questions (zero-based index).
    pub async fn run_suggestion(&self, session: &mut ChatSession, index: usize) -> AppResult<Answer> {
        let suggestion = session.suggestion(index)?;
        if suggestion.trim().is_empty() {
            return Err(AppError::Session("Suggestion is empty".to_string()));
        }

        session.push(Role::User, &suggestion);
        let mut answer = Answer::new(suggestion.clone(), suggestion);
        answer.intent = Some(Intent::Data);
        answer.routing = Some(Intent::Data.routing_message());
        self.answer_from_data(session, answer).await
    }
}
