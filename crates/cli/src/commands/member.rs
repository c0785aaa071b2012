//! Member command handler.

use crate::output;
use assist_agent::{sample_questions, Assistant, ChatSession};
use assist_core::{config::AppConfig, AppResult};
use clap::Args;

/// Look up the member calling from a phone number
#[derive(Args, Debug)]
pub struct MemberCommand {
    /// Phone number, e.g. 946-081-0513
    pub phone: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl MemberCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing member command for {}", self.phone);

        let assistant = Assistant::from_config(config.clone())?;
        let mut session = ChatSession::new();
        let message = assistant.select_member(&mut session, &self.phone).await?;

        if self.json {
            let output = serde_json::json!({
                "phone": self.phone,
                "member": session.member(),
                "initialChat": message,
                "sampleQuestions": sample_questions(&self.phone),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        match session.member() {
            Some(member) => {
                output::print_member(member);
                println!("{}", message);
            }
            None => println!("{}", message),
        }

        Ok(())
    }
}
