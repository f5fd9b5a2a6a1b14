//! Tag derivation from proposal text.
//!
//! Lowercases title+content, strips non-alphanumerics, and keeps the first
//! few content-bearing words as tags.

/// Words that carry no topic signal: articles, fillers, schedule words, and
/// the action verbs the synthesis rules themselves introduce.
const STOPWORDS: &[&str] = &[
    "about", "after", "also", "before", "call", "could", "from", "have", "into", "just", "make",
    "need", "please", "really", "reply", "respond", "should", "some", "sure", "that", "their",
    "them", "then", "there", "these", "they", "this", "those", "today", "tomorrow", "very",
    "want", "wants", "what", "when", "will", "with", "work", "would", "your",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Derive up to `limit` tags from a proposal's title and content.
///
/// Words of length <= 3 and stopwords are dropped; the remainder is deduped
/// preserving first occurrence.
pub fn derive(title: &str, content: &str, limit: usize) -> Vec<String> {
    let combined = format!("{} {}", title, content).to_lowercase();
    let cleaned: String = combined
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut tags: Vec<String> = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.len() <= 3 || is_stopword(word) {
            continue;
        }
        if !tags.iter().any(|t| t == word) {
            tags.push(word.to_string());
        }
        if tags.len() == limit {
            break;
        }
    }
    tags
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_basic() {
        let tags = derive("Fix deployment script", "", 3);
        assert_eq!(tags, vec!["deployment", "script"]);
    }

    #[test]
    fn test_derive_bounded_at_limit() {
        let tags = derive("alpha bravo charlie delta echo", "", 3);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_derive_drops_short_words() {
        // Every word here is <= 3 characters.
        let tags = derive("Fix the big bug now", "", 3);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_derive_drops_stopwords() {
        let tags = derive("Reply about their email today", "", 3);
        assert_eq!(tags, vec!["email".to_string()]);
    }

    #[test]
    fn test_derive_no_stopwords_ever_leak() {
        let tags = derive(
            "please make sure they will work with these those today tomorrow",
            "",
            10,
        );
        for tag in &tags {
            assert!(!is_stopword(tag), "stopword leaked: {}", tag);
            assert!(tag.len() > 3);
        }
        assert!(tags.is_empty());
    }

    #[test]
    fn test_derive_dedupes_preserving_first_occurrence() {
        let tags = derive("budget review", "budget numbers budget", 3);
        assert_eq!(tags, vec!["budget", "review", "numbers"]);
    }

    #[test]
    fn test_derive_strips_punctuation() {
        let tags = derive("Reply to Jane's email about budget", "", 3);
        // "jane's" splits into "jane" + "s"; "s" is dropped as too short.
        assert_eq!(tags, vec!["jane", "email", "budget"]);
    }

    #[test]
    fn test_derive_lowercases() {
        let tags = derive("QUARTERLY Deck", "", 3);
        assert_eq!(tags, vec!["quarterly", "deck"]);
    }

    #[test]
    fn test_derive_empty_input() {
        assert!(derive("", "", 3).is_empty());
    }

    #[test]
    fn test_derive_uses_content_when_title_is_empty() {
        let tags = derive("", "Prepare slides for the board meeting", 3);
        assert_eq!(tags, vec!["prepare", "slides", "board"]);
    }
}
