use std::collections::HashMap;

pub const STOPWORDS: [&str; 33] = [
    "the", "and", "or", "to", "for", "with", "a", "an", "of", "in", "on", "by", "is", "are",
    "from", "that", "this", "we", "our", "their", "they", "as", "at", "be", "it", "into",
    "across", "within", "around", "over", "need", "looking", "seeking",
];

/// Significant lower-cased tokens: ASCII alphanumeric runs longer than two characters
/// that are not stopwords. Duplicates are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| word.len() > 2)
        .map(|word| word.to_ascii_lowercase())
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .collect()
}

/// Python-style capitalize: first character upper-cased, the rest lower-cased.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Most frequent significant terms of a free-form profile, highest count first.
pub fn summarize_profile_text(text: &str, max_terms: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in tokenize(text) {
        let count = counts.entry(token.clone()).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    // stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(max_terms);
    order
}
