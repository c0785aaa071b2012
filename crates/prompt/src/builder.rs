//! Prompt builder: renders a definition with its variables.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use assist_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Declared variables that are not supplied render as empty text and are
/// reported in the metadata.
///
/// # Example
/// ```no_run
/// use assist_prompt::{build_prompt, load_prompt};
/// use std::collections::HashMap;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(Path::new("."), "intent.classify")?;
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "Share all information on this claim.".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("{}", built.text);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let missing_variables: Vec<String> = definition
        .variables
        .iter()
        .filter(|v| !variables.contains_key(*v))
        .cloned()
        .collect();

    if !missing_variables.is_empty() {
        tracing::warn!(
            "Prompt {} rendered without variables: {}",
            definition.id,
            missing_variables.join(", ")
        );
    }

    let text = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt {
        text,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            resolved_variables: variables,
            missing_variables,
        },
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{builtin, ids};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Question: {{question}}", &vars(&[("question", "Hello")]));
        assert_eq!(result.unwrap(), "Question: Hello");
    }

    #[test]
    fn test_render_does_not_escape() {
        let result = render_template("{{context}}", &vars(&[("context", "<b>'a' & \"b\"</b>")]));
        assert_eq!(result.unwrap(), "<b>'a' & \"b\"</b>");
    }

    #[test]
    fn test_render_invalid_template() {
        assert!(render_template("{{#if}}", &HashMap::new()).is_err());
    }

    #[test]
    fn test_answer_prompt_embeds_all_sections() {
        let def = builtin(ids::ANSWER_CONTEXT).unwrap();
        let built = build_prompt(
            &def,
            vars(&[
                ("context", "Document Name: faq/plans.pdf"),
                ("chatHistory", "user: hi"),
                ("question", "What plans exist?"),
            ]),
        )
        .unwrap();

        assert!(built.text.contains("<context>\nDocument Name: faq/plans.pdf\n</context>"));
        assert!(built.text.contains("<chat_history>\nuser: hi\n</chat_history>"));
        assert!(built.text.contains("<question>\nWhat plans exist?\n</question>"));
        assert!(built.metadata.missing_variables.is_empty());
        assert_eq!(built.metadata.source_prompt_id, "answer.context");
    }

    #[test]
    fn test_missing_variables_are_reported() {
        let def = builtin(ids::ANSWER_CONTEXT).unwrap();
        let built = build_prompt(&def, vars(&[("question", "q")])).unwrap();
        assert_eq!(
            built.metadata.missing_variables,
            vec!["context".to_string(), "chatHistory".to_string()]
        );
        assert!(built.text.contains("<context>\n\n</context>"));
    }
}
