//! Prompt assembly for chat turns

/// Number of history entries included in a chat prompt
pub const HISTORY_WINDOW: usize = 5;

/// Behavior settings, plus the caller's context when one was given.
pub fn build_system_prompt(behavior_settings: &str, context: Option<&str>) -> String {
    match context.filter(|c| !c.is_empty()) {
        Some(context) => format!("{}\n\nContext provided: {}", behavior_settings, context),
        None => behavior_settings.to_string(),
    }
}

/// Render the last few history entries as a bullet block.
///
/// Empty history renders as an empty string.
pub fn format_conversation_history(history: &[String]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let lines: Vec<String> = history[start..]
        .iter()
        .map(|msg| format!("- {}", msg))
        .collect();
    format!("\n\nConversation History:\n{}", lines.join("\n"))
}

pub fn build_user_message(history: &[String], message: &str) -> String {
    format!("{}\nUser: {}", format_conversation_history(history), message)
}
