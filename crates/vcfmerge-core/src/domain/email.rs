/// Comparison key used when deduplicating email addresses.
pub fn email_match_key(value: &str) -> String {
    value.trim().to_lowercase()
}
