//! Petal content filter
//!
//! Single-pass, case-insensitive keyword match over a fixed blocklist.
//! Terms only match as whole words, so a blocked word embedded in a longer
//! one ("hell" in "hello", "ass" in "classic") passes.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

pub const PROFANITY: &[&str] = &[
    "darn", "heck", "gosh", "shoot", "frak", "ass", "asshole", "bastard", "bitch", "crap",
    "cunt", "damn", "dick", "douche", "fag", "fuck", "hell", "motherfucker", "piss", "pussy",
    "shit", "slut", "twat", "whore",
];

/// Words unsuited to remembrance or well-wishes.
pub const SENSITIVE: &[&str] = &["kill", "die", "murder", "suicide", "hate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Profanity,
    Sensitive,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profanity => "profanity",
            Self::Sensitive => "sensitive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockedTerm {
    pub term: String,
    pub category: Category,
}

static BLOCKLIST: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = PROFANITY
        .iter()
        .chain(SENSITIVE)
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    // Terms are fixed ASCII words; the pattern is known to compile.
    // Boundaries are ASCII, so an accented letter next to a term still
    // counts as a word break.
    Regex::new(&format!(r"(?i)(?-u:\b)(?:{})(?-u:\b)", alternation)).expect("blocklist pattern")
});

fn category_of(term: &str) -> Category {
    if SENSITIVE.contains(&term) {
        Category::Sensitive
    } else {
        Category::Profanity
    }
}

/// True when `text` contains any blocked term as a standalone word.
/// Missing or empty text is never blocked.
pub fn contains_blocked_term<'a>(text: impl Into<Option<&'a str>>) -> bool {
    match text.into() {
        Some(text) if !text.is_empty() => BLOCKLIST.is_match(text),
        _ => false,
    }
}

/// True when `text` may be published. Exact negation of [`contains_blocked_term`].
pub fn is_admissible<'a>(text: impl Into<Option<&'a str>>) -> bool {
    !contains_blocked_term(text)
}

/// Every distinct blocked term found in `text`, lower-cased, in sorted order.
pub fn blocked_terms(text: &str) -> Vec<BlockedTerm> {
    BLOCKLIST
        .find_iter(text)
        .map(|m| {
            let term = m.as_str().to_lowercase();
            let category = category_of(&term);
            BlockedTerm { term, category }
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standalone_term_is_blocked() {
        assert!(!is_admissible("what the hell"));
        assert!(!is_admissible("Hell."));
        assert!(!is_admissible("HELL-bent on it"));
        assert!(contains_blocked_term("oh, damn"));
    }

    #[test]
    fn embedded_term_is_not_blocked() {
        assert!(is_admissible("hello there"));
        assert!(is_admissible("a classic bouquet"));
        assert!(is_admissible("seashells by the shore"));
        assert!(is_admissible("diet and dietary notes"));
        assert!(is_admissible("skillful"));
    }

    #[test]
    fn accented_neighbour_is_a_word_break() {
        assert!(!is_admissible("hellö"));
        assert!(!is_admissible("éhell"));
        assert!(is_admissible("hello"));
    }

    #[test]
    fn empty_and_missing_are_admissible() {
        assert!(is_admissible(""));
        assert!(is_admissible(None));
        assert!(!contains_blocked_term(None));
    }

    #[test]
    fn every_listed_term_blocks_on_its_own() {
        for term in PROFANITY.iter().chain(SENSITIVE) {
            assert!(!is_admissible(*term), "{} should be blocked", term);
            let upper = term.to_uppercase();
            assert!(!is_admissible(upper.as_str()), "{} should be blocked", upper);
        }
    }

    #[test]
    fn longer_term_matches_whole_word() {
        let found = blocked_terms("you asshole");
        assert_eq!(
            found,
            vec![BlockedTerm { term: "asshole".into(), category: Category::Profanity }]
        );
    }

    #[test]
    fn blocked_terms_reports_categories_once() {
        let found = blocked_terms("I HATE this, hate it, damn");
        assert_eq!(found.len(), 2);
        assert!(found.contains(&BlockedTerm { term: "hate".into(), category: Category::Sensitive }));
        assert!(found.contains(&BlockedTerm { term: "damn".into(), category: Category::Profanity }));
    }

    #[test]
    fn kind_message_passes() {
        assert!(is_admissible("Thinking of you"));
        assert!(blocked_terms("Thinking of you").is_empty());
    }
}
