//! Error message sanitization.
//!
//! Provider error bodies occasionally echo request fragments back; strip
//! anything that looks like a credential before it reaches logs or the
//! model-visible error string.

static KEY_PATTERNS: &[&str] = &["sk-ant-", "sk-", "Bearer "];

pub fn sanitize_api_error(message: &str) -> String {
    let mut sanitized = message.to_string();
    for pattern in KEY_PATTERNS {
        while let Some(start) = sanitized.find(pattern) {
            let end = sanitized[start..]
                .find(|c: char| c.is_whitespace() || c == '"')
                .map_or(sanitized.len(), |offset| start + offset);
            sanitized.replace_range(start..end, "[redacted]");
        }
    }
    sanitized
}
