//! Ask command handler.
//!
//! Runs one question through the full pipeline, optionally on behalf of a
//! member selected by phone number.

use crate::output;
use assist_agent::{Assistant, ChatSession, Intent, NO_MEMBER_FOUND};
use assist_core::{config::AppConfig, AppError, AppResult};
use clap::Args;

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Skip classification and route to this agent (recordings, faq, data)
    #[arg(long)]
    pub intent: Option<String>,

    /// Phone number of the calling member
    #[arg(long)]
    pub phone: Option<String>,

    /// Restrict the question to the selected member
    #[arg(long, requires = "phone")]
    pub restrict: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let mut config = config.clone();
        if let Some(intent) = &self.intent {
            let intent = Intent::parse(intent)
                .ok_or_else(|| AppError::Config(format!("Unknown intent: {}", intent)))?;
            config.chat.classify_intent = false;
            config.chat.default_intent = intent.as_str().to_string();
        }

        let assistant = Assistant::from_config(config)?;
        let mut session = ChatSession::new();

        if let Some(phone) = &self.phone {
            assistant.select_member(&mut session, phone).await?;
            if session.member().is_none() {
                return Err(AppError::Session(NO_MEMBER_FOUND.to_string()));
            }
            session.set_restricted(self.restrict)?;
        }

        let question = self.question.join(" ");
        let answer = assistant.ask(&mut session, &question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            output::print_answer(&answer);
        }

        Ok(())
    }
}
