//! Adapting role-structured prompts for text-only backends

use crate::models::PromptMessages;
use crate::models::Role;

fn role_label(role: Role) -> &'static str {
    match role {
        Role::System => "System",
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}

/// Flatten messages into one transcript ending with an open assistant turn
#[must_use]
pub fn flatten_messages(messages: &PromptMessages) -> String {
    let mut prompt = String::new();
    for message in messages.messages() {
        prompt.push_str(&format!(
            "### {}:\n{}\n\n",
            role_label(message.role),
            message.content.trim_end()
        ));
    }
    prompt.push_str("### Assistant:\n");
    prompt
}
