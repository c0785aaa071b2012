//! Chat command handler.
//!
//! Interactive session for an agent on a live call. Plain input is asked
//! through the pipeline; lines starting with `/` are session commands.

use crate::output;
use assist_agent::{sample_questions, Assistant, ChatSession, DraftAction, SAMPLE_PHONE_NUMBERS};
use assist_core::{config::AppConfig, AppError, AppResult};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm, Editor, Input};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = "assist> ";

const HELP: &str = "\
Commands:
  /member <phone>     Select the calling member
  /samples            List demo phone numbers
  /sample <n>         Ask sample question n for the selected member
  /restrict on|off    Restrict questions to the selected member
  /suggest <n>        Ask suggested question n from the analyst
  /action             Recommend and send a follow-up email
  /history            Show the conversation
  /reset              Start over
  /model <name>       Switch completion model
  /mode api|sql       Switch completion mode
  /debug on|off       Show refined queries and intents
  /prompt on|off      Show rendered prompts
  /help               Show this help
  /quit               Exit";

/// Interactive chat session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Phone number of the calling member
    #[arg(long)]
    pub phone: Option<String>,

    /// Restrict questions to the selected member
    #[arg(long, requires = "phone")]
    pub restrict: bool,
}

enum Flow {
    Continue,
    /// Pre-fill the next input line
    Prefill(String),
    Quit,
}

struct ChatLoop {
    assistant: Assistant,
    session: ChatSession,
    recipient: Option<String>,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let mut chat = ChatLoop {
            assistant: Assistant::from_config(config.clone())?,
            session: ChatSession::new(),
            recipient: config.email.recipient.clone(),
        };
        tracing::debug!("Chat session {}", chat.session.id());

        println!(
            "Call Center Assist ({}, {} mode). Type /help for commands.",
            config.completion.model, config.completion.mode
        );
        println!();

        let mut prefill = String::new();
        if let Some(phone) = &self.phone {
            if let Flow::Prefill(text) = chat.select_member(phone).await? {
                prefill = text;
            }
            if self.restrict {
                chat.session.set_restricted(true)?;
            }
        }

        let mut editor =
            DefaultEditor::new().map_err(|e| AppError::Other(format!("Terminal error: {}", e)))?;

        loop {
            let line = match editor.readline_with_initial(PROMPT, (prefill.as_str(), "")) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(AppError::Other(format!("Input error: {}", e))),
            };
            prefill.clear();

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Err(e) = editor.add_history_entry(line) {
                tracing::debug!("Failed to record history entry: {}", e);
            }

            let flow = if line.starts_with('/') {
                chat.command(line).await
            } else {
                chat.ask(line).await
            };

            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Prefill(text)) => prefill = text,
                Ok(Flow::Quit) => break,
                Err(e) => {
                    tracing::debug!("Interaction failed: {:?}", e);
                    eprintln!("Error: {}", e);
                }
            }
        }

        tracing::info!("Chat session {} ended", chat.session.id());
        Ok(())
    }
}

impl ChatLoop {
    async fn ask(&mut self, question: &str) -> AppResult<Flow> {
        let answer = self.assistant.ask(&mut self.session, question).await?;
        output::print_answer(&answer);
        Ok(Flow::Continue)
    }

    async fn command(&mut self, line: &str) -> AppResult<Flow> {
        let (command, arg) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));

        match command {
            "/help" => println!("{}", HELP),
            "/quit" | "/exit" => return Ok(Flow::Quit),
            "/reset" => {
                self.session.reset();
                println!("Conversation cleared.");
            }
            "/member" => {
                if arg.is_empty() {
                    return Err(AppError::Session("Usage: /member <phone>".to_string()));
                }
                return self.select_member(arg).await;
            }
            "/samples" => {
                for phone in SAMPLE_PHONE_NUMBERS {
                    println!("  {}", phone);
                }
            }
            "/sample" => {
                let member = self
                    .session
                    .member()
                    .ok_or_else(|| AppError::Session("Select a member first".to_string()))?;
                let questions = sample_questions(&member.phone);
                let question = questions
                    .get(parse_index(arg)?)
                    .ok_or_else(|| {
                        AppError::Session(format!("No sample question {}", arg))
                    })?
                    .to_string();
                println!("{}", question);
                return self.ask(&question).await;
            }
            "/restrict" => {
                let on = parse_toggle(arg)?;
                self.session.set_restricted(on)?;
                println!("Member restriction {}.", if on { "on" } else { "off" });
            }
            "/suggest" => {
                let answer = self
                    .assistant
                    .run_suggestion(&mut self.session, parse_index(arg)?)
                    .await?;
                output::print_answer(&answer);
            }
            "/action" => self.action().await?,
            "/history" => output::print_history(self.session.messages()),
            "/model" => {
                self.assistant.set_model(arg)?;
                println!("Model: {}", arg);
            }
            "/mode" => {
                self.assistant.set_mode(arg)?;
                println!("Mode: {} ({})", arg, self.assistant.provider_name());
            }
            "/debug" => {
                self.assistant.chat_config_mut().debug = parse_toggle(arg)?;
            }
            "/prompt" => {
                self.assistant.chat_config_mut().show_prompt = parse_toggle(arg)?;
            }
            other => {
                return Err(AppError::Session(format!(
                    "Unknown command {}. Type /help for commands.",
                    other
                )))
            }
        }
        Ok(Flow::Continue)
    }

    async fn select_member(&mut self, phone: &str) -> AppResult<Flow> {
        let message = self.assistant.select_member(&mut self.session, phone).await?;
        match self.session.member() {
            Some(member) => {
                output::print_member(member);
                Ok(Flow::Prefill(message))
            }
            None => {
                println!("{}", message);
                Ok(Flow::Continue)
            }
        }
    }

    /// Recommend a follow-up, let the agent edit the draft, then send it.
    async fn action(&mut self) -> AppResult<()> {
        if self.session.messages().is_empty() {
            println!("Ask a question first.");
            return Ok(());
        }

        let action = self.assistant.next_best_action(&self.session).await;
        println!("Next best action:");
        println!("{}", action.text);
        println!();
        if !action.actionable {
            return Ok(());
        }

        let theme = ColorfulTheme::default();
        if !Confirm::with_theme(&theme)
            .with_prompt("Draft this action?")
            .default(true)
            .interact()
            .map_err(prompt_error)?
        {
            return Ok(());
        }

        let Some(draft) = self.assistant.draft_action(&self.session, &action.text).await? else {
            println!("Unable to draft an email for this action.");
            return Ok(());
        };

        let subject: String = Input::with_theme(&theme)
            .with_prompt("Subject")
            .with_initial_text(draft.subject.clone())
            .interact_text()
            .map_err(prompt_error)?;

        println!();
        println!("{}", draft.body);
        println!();
        let body = if Confirm::with_theme(&theme)
            .with_prompt("Edit the body?")
            .default(false)
            .interact()
            .map_err(prompt_error)?
        {
            Editor::new()
                .edit(&draft.body)
                .map_err(prompt_error)?
                .unwrap_or(draft.body)
        } else {
            draft.body
        };

        let recipient: String = Input::with_theme(&theme)
            .with_prompt("Recipient")
            .with_initial_text(self.recipient.clone().unwrap_or_default())
            .interact_text()
            .map_err(prompt_error)?;

        if !Confirm::with_theme(&theme)
            .with_prompt(format!("Send email to {}?", recipient))
            .default(false)
            .interact()
            .map_err(prompt_error)?
        {
            println!("Email not sent.");
            return Ok(());
        }

        self.assistant
            .send_email(&recipient, &DraftAction { subject, body })
            .await?;
        self.recipient = Some(recipient);
        println!("Email sent.");
        Ok(())
    }
}

fn prompt_error(e: dialoguer::Error) -> AppError {
    AppError::Other(format!("Prompt failed: {}", e))
}

fn parse_toggle(arg: &str) -> AppResult<bool> {
    match arg.to_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(AppError::Session(format!("Expected on or off, got {:?}", arg))),
    }
}

/// Parse a 1-based number into a 0-based index.
fn parse_index(arg: &str) -> AppResult<usize> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(AppError::Session(format!("Expected a number from 1, got {:?}", arg))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toggle() {
        assert!(parse_toggle("ON").unwrap());
        assert!(!parse_toggle("off").unwrap());
        assert!(parse_toggle("maybe").is_err());
    }

    #[test]
    fn test_prompt_error_maps_to_app_error() {
        let e = dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::Other,
            "editor exited",
        ));
        match prompt_error(e) {
            AppError::Other(msg) => assert!(msg.contains("editor exited")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("1").unwrap(), 0);
        assert_eq!(parse_index("3").unwrap(), 2);
        assert!(parse_index("0").is_err());
        assert!(parse_index("x").is_err());
    }
}
