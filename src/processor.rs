pub const STATUS_PLACEHOLDER: &str = "$?";

/// Replaces every `$?` token with the decimal form of `status`.
pub fn expand_status(tokens: &mut [String], status: i32) {
    let rendered = status.to_string();
    for token in tokens.iter_mut().filter(|t| t.as_str() == STATUS_PLACEHOLDER) {
        token.clone_from(&rendered);
    }
}
