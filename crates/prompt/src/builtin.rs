//! Built-in prompt templates.
//!
//! Every template can be replaced per workspace with
//! `.assist/prompts/<id>.yml`; see [`crate::loader`].

use crate::types::PromptDefinition;

/// Prompt identifiers.
pub mod ids {
    pub const QUESTION_REFINE: &str = "question.refine";
    pub const ANSWER_CONTEXT: &str = "answer.context";
    pub const INTENT_CLASSIFY: &str = "intent.classify";
    pub const ANALYST_SUMMARIZE: &str = "analyst.summarize";
    pub const POLICY_VIOLATION: &str = "policy.violation";
    pub const ACTION_NEXT: &str = "action.next";
    pub const ACTION_DRAFT: &str = "action.draft";
}

const QUESTION_REFINE: &str = r#"You are a chatbot expert. Refer the latest question received by the chatbot, evaluate this in context of the Chat History found below.
Now share a refined query which captures the full meaning of the question being asked.

If the question appears to be a stand alone question ignore all previous interactions or chat history and focus solely on the question.
If it seem to be connected to the prior chat history, only then use the chat history.

Please use the question as the prominent input and the Chat history as a support input when summarizing.
Answer with only the query. Do not add any explanation.

Chat History: {{chatHistory}}
Question: {{question}}
"#;

const ANSWER_CONTEXT: &str = r#"You are an expert chat assistant that extracts information from the CONTEXT provided between <context> and </context> tags.
You offer a chat experience considering the information included in the CHAT HISTORY provided between <chat_history> and </chat_history> tags.
When answering the question contained between <question> and </question> tags, be concise and do not hallucinate.
If you don't have the information, just say so.

Do not mention the CONTEXT in your answer.
Do not mention the CHAT HISTORY in your answer.

<context>
{{context}}
</context>
<chat_history>
{{chatHistory}}
</chat_history>
<question>
{{question}}
</question>
Answer:
"#;

const INTENT_CLASSIFY: &str = r#"You are an expert that classifies the question into one of the following categories:

1. Recordings
2. FAQ
3. Data

If the question is related to information that can be pulled from a table holding information on:
    - Gender
    - Address
    - Claims
    - Grievances
Then respond with category as 'Data'.
If the question is related to information from any prior call recordings or calls made to the call center, respond with category as 'Recordings'.
If the question is related to generic information similar to what you would find in an FAQ document, respond with category as 'FAQ'.

For e.g.

    Question : Can you give me a summary from the previous call made by Nicholas Carter
    Answer: Recordings

    Question : Can you share me the current benefit plan for Member ID M123456?
    Answer: Data

    Question : How can a member find out the available list of providers?
    Answer: FAQ

    Question : Can you share me the address information of Member Name Nicholas Carter ?
    Answer: Data

    Question : Can you share me all available information on claim ID C1022345?
    Answer: Data

    Question : Where there any recent changes on COVID coverages being offered?
    Answer: FAQ

Be concise and ensure the response is strictly one word only and do not hallucinate.
If you don't have the information, just say so.

<question>
{{question}}
</question>
Answer:
"#;

const ANALYST_SUMMARIZE: &str = r#"You are an expert data analyst who translated the question contained between <question> and </question> tags:

<question>
{{question}}
</question>

Into the SQL query contained between <SQL> and </SQL> tags:

<SQL>
{{sql}}
</SQL>

And retrieved the following result set contained between <df> and </df> tags:

<df>
{{resultSet}}
</df>

Now share an answer to this question based on the SQL query and result set.
Be concise and use mainly the CONTEXT provided and do not hallucinate.
If you don't have the information, just say so.

Whenever possible, arrange your response as bullet points.

Example:
- Claim ID:
- Service:
- Provider:

Do not mention the CONTEXT in your answer.

Answer:
"#;

const POLICY_VIOLATION: &str = r#"You are an expert that determines whether a question violates the policy of accessing only data for the selected member.

If the question contains any member names other than {{memberName}} or member IDs other than {{memberId}}, then respond with 'Yes'.
Otherwise, respond with 'No'.

Be concise and ensure the response is strictly one word only and do not hallucinate.

<question>
{{question}}
</question>
Answer:
"#;

const ACTION_NEXT: &str = r#"You are an intelligent call center assistant.
Below is the conversation related to an ongoing call center interaction.
Please analyze the Chat History: {{chatHistory}}
and determine the most appropriate next action to take.

    - If the member was requesting some FAQ oriented information,
      then regardless of whether this information was provided on the chat,
      the related details should be sent once again to {{memberName}} via an email.

    - If the member was raising a concern or request related to something else, and only if you infer
      that some concern or request is still left unaddressed, then the best action is to send a
      contextualized email addressing the concern or request from {{memberName}} to the appropriate internal team.

    - If unable to determine, respond stating 'Unable to determine next best action with information available'

If both an email to the member and an email to an internal department seem warranted,
choose only one of those emails as the recommended action.

Internal Team Mapping
    Claim Related Concerns (e.g. Inaccurate Billing, Delay in claim processing etc) : Claim Ops
    New Enrollment Related Concerns : Enrollment Ops
    Provider Related Concerns (e.g. Inadequate Care) : Provider Ops

Please provide a short response in the following format:
- [Action to take]

Please don't include any additional info in the response.
"#;

const ACTION_DRAFT: &str = r#"You are an intelligent call center assistant.
Below is the conversation related to an ongoing call center interaction.
Please analyze the Chat History: {{chatHistory}}
and the Next Best Action identified: {{nextBestAction}}

And perform either one of the two:

1) When the next best action is sending some information to the member,
   generate a contextualized email with the information at hand from the chat history.
   Refer to the FAQ URL when crafting the email: https://www.enterprise-next.com/member/FAQS

2) When the next best action is sending an email to the appropriate internal department,
   generate a contextualized email detailing the member's concern or request and asking the
   internal department to act on it. Add information from the chat history when appropriate.

Refer to the below where needed
Member Name: {{memberName}}
Member ID: {{memberId}}

Internal Team Mapping
    Claim Related Concerns : Claim Ops
    New Enrollment Related Concerns : Enrollment Ops
    Provider Related Concerns : Provider Ops

The email subject should always start with the Member ID formatted as text, without commas.
Sign the email with
Enterprise Nxt Call Center Ops

Generate the email in the following format:

Subject: [Email Subject]
Body:
[Email Body]

Example:
Subject: 943130253 | Request related to inadequate Care

Keep the email professional and concise.
When the email is addressed to a member, add a line thanking them for being a member of Enterprise Next.
Do not repeat the same or similar information.

Please don't include any additional info in the response.
"#;

fn definition(id: &str, title: &str, variables: &[&str], template: &str) -> PromptDefinition {
    PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        variables: variables.iter().map(|v| v.to_string()).collect(),
        template: template.to_string(),
    }
}

/// All built-in prompt definitions.
pub fn builtin_definitions() -> Vec<PromptDefinition> {
    vec![
        definition(
            ids::QUESTION_REFINE,
            "Rewrite a follow-up question as a standalone query",
            &["chatHistory", "question"],
            QUESTION_REFINE,
        ),
        definition(
            ids::ANSWER_CONTEXT,
            "Answer from retrieved context and chat history",
            &["context", "chatHistory", "question"],
            ANSWER_CONTEXT,
        ),
        definition(
            ids::INTENT_CLASSIFY,
            "Classify a question as Recordings, FAQ or Data",
            &["question"],
            INTENT_CLASSIFY,
        ),
        definition(
            ids::ANALYST_SUMMARIZE,
            "Summarize an analyst SQL result set",
            &["question", "sql", "resultSet"],
            ANALYST_SUMMARIZE,
        ),
        definition(
            ids::POLICY_VIOLATION,
            "Detect questions about members other than the selected one",
            &["memberName", "memberId", "question"],
            POLICY_VIOLATION,
        ),
        definition(
            ids::ACTION_NEXT,
            "Recommend the next best action",
            &["chatHistory", "memberName"],
            ACTION_NEXT,
        ),
        definition(
            ids::ACTION_DRAFT,
            "Draft a follow-up email",
            &["chatHistory", "nextBestAction", "memberName", "memberId"],
            ACTION_DRAFT,
        ),
    ]
}

/// Look up a built-in definition by ID.
pub fn builtin(id: &str) -> Option<PromptDefinition> {
    builtin_definitions().into_iter().find(|d| d.id == id)
}
