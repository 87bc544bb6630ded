//! TwiML messaging envelope for the chat webhook channel.
//!
//! The webhook transport expects `<Response><Message>…</Message></Response>`
//! with XML-escaped content, served as `application/xml`.

/// Wrap reply text in the messaging envelope, escaping XML entities.
pub fn message_response(text: &str) -> String {
    format!(
        "<Response><Message>{}</Message></Response>",
        xml_escape(text)
    )
}

/// Escape special XML characters. The ampersand must be replaced first so
/// the entities produced by the later replacements are left intact.
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
