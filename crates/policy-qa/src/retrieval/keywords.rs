//! Key-term parsing

/// Turn a model's key-term reply into search terms.
///
/// Tokens are split on whitespace, stripped of surrounding punctuation
/// (list markers, commas, quotes), lowercased, and dropped when shorter than
/// `min_len` characters. Duplicates are removed, first occurrence wins.
pub fn parse_key_terms(reply: &str, min_len: usize) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();

    for token in reply.split_whitespace() {
        let term = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        if term.chars().count() < min_len || terms.contains(&term) {
            continue;
        }
        terms.push(term);
    }

    terms
}
