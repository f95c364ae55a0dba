//! Output checks applied to every model reply before it leaves the gateway

pub const EMPTY_REPLY: &str = "Thinking...";
pub const REFUSAL: &str = "I cannot talk about that.";

const RESTRICTED_MARKERS: &[&str] = &["<unsafe_content>"];

pub fn validate_response(text: &str) -> String {
    if text.is_empty() {
        return EMPTY_REPLY.to_string();
    }
    if RESTRICTED_MARKERS.iter().any(|marker| text.contains(marker)) {
        return REFUSAL.to_string();
    }
    text.to_string()
}
