//! Fuzzy phrase matching over recognized text
//!
//! Speech transcripts are noisy ("creat project", "criar projecto"), so
//! command detection uses approximate containment: a verbatim substring
//! check first, then Levenshtein similarity over word windows.

use unicode_segmentation::UnicodeSegmentation;

use deco_voice_config::CommandTables;

/// Classic Levenshtein distance (insert/delete/substitute cost 1),
/// computed over Unicode scalar values with the standard DP table.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized similarity `1 - distance / max(len)`, always in `[0, 1]`.
/// Two empty strings are identical (similarity 1).
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Fuzzy containment test: does `text` contain (approximately) `phrase`?
///
/// Normalizes both sides, takes the verbatim-substring fast path, then
/// slides a window of `phrase`'s word count across `text`'s words and
/// accepts if any window's similarity clears `threshold`. When the phrase
/// has more words than the text, the whole strings are compared instead.
pub fn fuzzy_contains(text: &str, phrase: &str, threshold: f64) -> bool {
    let text = text.trim().to_lowercase();
    let phrase = phrase.trim().to_lowercase();

    if text.contains(&phrase) {
        return true;
    }

    let text_words: Vec<&str> = text.unicode_words().collect();
    let phrase_words: Vec<&str> = phrase.unicode_words().collect();
    let k = phrase_words.len();

    if k == 0 || text_words.is_empty() || k > text_words.len() {
        return similarity(&text, &phrase) >= threshold;
    }

    let phrase_joined = phrase_words.join(" ");
    text_words
        .windows(k)
        .any(|window| similarity(&window.join(" "), &phrase_joined) >= threshold)
}

/// Matcher over the configured multilingual command trigger tables
#[derive(Debug, Clone)]
pub struct CommandMatcher {
    create_project: Vec<String>,
    threshold: f64,
}

impl CommandMatcher {
    /// Build from the configured tables; `threshold` is normally 0.75 for
    /// the multilingual create-project phrase lists.
    pub fn new(tables: &CommandTables, threshold: f64) -> Self {
        Self {
            create_project: tables
                .all_create_project_phrases()
                .map(|s| s.to_string())
                .collect(),
            threshold,
        }
    }

    /// Whether `text` carries a create-project intent in any locale.
    pub fn matches_create_project(&self, text: &str) -> bool {
        self.matched_phrase(text).is_some()
    }

    /// The trigger phrase that matched, if any.
    pub fn matched_phrase(&self, text: &str) -> Option<&str> {
        self.create_project
            .iter()
            .find(|phrase| fuzzy_contains(text, phrase, self.threshold))
            .map(|s| s.as_str())
    }
}
