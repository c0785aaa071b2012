//! Prompts command handler.
//!
//! Lists the prompt templates and shows their source, so workspace
//! overrides in `.assist/prompts/` can be checked.

use assist_core::{config::AppConfig, AppResult};
use assist_prompt::{list_prompts, load_prompt, PromptSource};
use clap::{Args, Subcommand};

/// Inspect prompt templates
#[derive(Args, Debug)]
pub struct PromptsCommand {
    #[command(subcommand)]
    pub action: PromptsAction,
}

#[derive(Subcommand, Debug)]
pub enum PromptsAction {
    /// List prompt templates
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one template
    Show {
        /// Prompt ID, e.g. answer.context
        id: String,
    },
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            PromptsAction::List { json } => {
                let prompts = list_prompts(&config.workspace)?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&prompts)?);
                    return Ok(());
                }
                for prompt in prompts {
                    let source = match prompt.source {
                        PromptSource::Builtin => "builtin",
                        PromptSource::Workspace => "workspace",
                    };
                    println!("{:<20} {:<10} {}", prompt.id, source, prompt.title);
                }
            }
            PromptsAction::Show { id } => {
                let definition = load_prompt(&config.workspace, id)?;
                println!("{} ({})", definition.id, definition.title);
                println!("Variables: {}", definition.variables.join(", "));
                println!();
                println!("{}", definition.template);
            }
        }
        Ok(())
    }
}
