use regex::RegexBuilder;

/// Counts whole-word, case-insensitive mentions of `name` in `text`.
///
/// A trailing `'s` or `s` is part of the same match, so "Acme's" counts once.
pub fn count_mentions(text: &str, name: &str) -> usize {
    let name = name.trim();
    if text.is_empty() || name.is_empty() {
        return 0;
    }

    let pattern = format!(r"\b{}(?:'?s)?\b", regex::escape(name));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.find_iter(text).count(),
        Err(e) => {
            tracing::warn!("Could not build mention pattern for '{}': {}", name, e);
            0
        }
    }
}

pub fn mention_summary(name: &str, count: usize) -> String {
    match count {
        1 => format!("✓ '{}' is mentioned once in the article", name),
        n => format!("✓ '{}' is mentioned {} times in the article", name, n),
    }
}
