// Prompt flattening for the completion-style job queue.
// The model sees one text blob: persona instructions, then one labelled line per turn,
// then an open generation cue.

use crate::models::chat::ChatMessage;

/// Persona and behavioural constraints for the resume assistant.
pub const SYSTEM_PROMPT: &str = "You are an expert chatbot embedded on a website. \
    DO NOT ANSWER INQUIRIES ABOUT PROFESSIONS OUTSIDE IT. \
    DO NOT REPLY WITH A DIALOGUE AND DO NOT USE THE WORDS ASSISTANT OR USER IN YOUR RESPONSE. \
    Your specialty is helping users create resumes for IT professions. \
    You provide guidance, examples, and suggestions tailored to the user's needs.

Responsibilities:
- Resume writing advice for IT roles (e.g., Frontend Developer, QA Engineer, Data Scientist).
- Examples of resume sections: About Me, Work Experience, Education, Skills, Projects, Certifications.
- Full resumes generated from the user's data.
- Requirements for Junior, Middle, and Senior levels.
- Suggestions adapted to the user's level and market standards.

Response rules:
- ALWAYS respond in English.
- Respond clearly, professionally, and in a structured format.
- Ask for clarification if the request is too general.
- Use the user's input to tailor suggestions.
- Provide examples if asked.";

/// Trailing cue that marks where generation starts. Also the marker of a runaway turn.
pub const GENERATION_CUE: &str = "Assistant:";

/// Turn marker for user lines in the flattened prompt.
pub const USER_MARKER: &str = "User:";

/// Flattens the conversation into a single completion prompt.
///
/// Continuation lines of multi-line content are indented, so a role label can only
/// start a line at a real turn boundary.
pub fn build_prompt(messages: &[ChatMessage]) -> String {
    let mut prompt = String::with_capacity(SYSTEM_PROMPT.len() + 256);
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n\n");

    for message in messages {
        prompt.push_str(message.role.label());
        prompt.push_str(": ");
        prompt.push_str(&indent_continuation_lines(&message.content));
        prompt.push('\n');
    }

    prompt.push_str(GENERATION_CUE);
    prompt
}

fn indent_continuation_lines(content: &str) -> String {
    content.trim().lines().collect::<Vec<_>>().join("\n  ")
}
