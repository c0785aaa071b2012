//! Terminal rendering of answers and member details.
//!
//! Everything here goes to stdout; logs stay on stderr.

use assist_agent::{sample_questions, Answer, MemberContext, Message};

pub fn print_answer(answer: &Answer) {
    for note in &answer.notes {
        println!("[{}]", note.label);
        println!("{}", note.text);
        println!();
    }

    if let Some(interpretation) = &answer.interpretation {
        println!("{}", interpretation);
        println!();
    }

    if let Some(routing) = &answer.routing {
        println!("{}", routing);
        println!();
    }

    if !answer.text.is_empty() {
        println!("{}", answer.text);
    }

    if let Some(sql) = &answer.sql {
        println!();
        println!("SQL:");
        println!("{}", sql);
    }

    if let Some(rows) = &answer.result_set {
        println!();
        print!("{}", rows.to_table_string());
    }

    if !answer.suggestions.is_empty() {
        println!();
        println!("Suggestions (use /suggest <n>):");
        for (i, suggestion) in answer.suggestions.iter().enumerate() {
            println!("  {}. {}", i + 1, suggestion);
        }
    }

    if !answer.documents.is_empty() {
        println!();
        println!("Sources:");
        for doc in &answer.documents {
            println!("- {}", doc.path);
            println!("  {}", doc.url);
        }
    }
    println!();
}

pub fn print_member(member: &MemberContext) {
    println!("Member: {} ({})", member.name, member.member_id);
    println!("Caller intent: {}", member.caller_intent);

    let questions = sample_questions(&member.phone);
    if !questions.is_empty() {
        println!();
        println!("Sample questions (use /sample <n>):");
        for (i, question) in questions.iter().enumerate() {
            println!("  {}. {}", i + 1, question);
        }
    }
    println!();
}

pub fn print_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("(no messages)");
        return;
    }
    for message in messages {
        println!("{}: {}", message.role.as_str(), message.content);
    }
}
