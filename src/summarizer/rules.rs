//! Rule-based summarizer
//!
//! Ordered literal substitution of Polish legal jargon (with a short
//! English tail), followed by heading normalisation and truncation.

use tracing::debug;

use super::{Summarizer, EMPTY_INPUT_SUMMARY, MAX_SUMMARY_CHARS};

/// Substitution table, applied top to bottom.
///
/// Ordering rule: a key that contains another key must come first,
/// otherwise the shorter key fires and the longer one can never match.
/// Replacements must not contain any key applied after them.
pub const REPLACEMENTS: &[(&str, &str)] = &[
    // Multi-word phrases
    ("niezależnie od postanowień", "mimo postanowień"),
    ("niezależnie od", "mimo że"),
    ("niniejszym ustawą", "tą ustawą"),
    ("zgodnie z", "według"),
    ("w ramach", "w granicach"),
    ("w zakresie", "w granicach"),
    ("wspomniany wyżej", "wymieniony wyżej"),
    ("w którym", "gdzie"),
    ("w której", "gdzie"),
    ("przed wejściem w życie", "zanim zacznie obowiązywać"),
    ("wchodzi w życie", "zaczyna obowiązywać"),
    ("do dnia", "przed"),
    ("od dnia", "od"),
    ("prawo do udziału", "może uczestniczyć"),
    ("prawo do", "może"),
    ("osoba prawna", "organizacja"),
    ("osób prawnych", "organizacji"),
    ("osoba fizyczna", "osoba prywatna"),
    ("przysługuje prawo", "ma prawo"),
    ("upoważnia do", "daje prawo do"),
    ("zabrania się", "nie wolno"),
    ("dopuszcza się", "można"),
    ("z wyjątkiem", "oprócz"),
    ("pod warunkiem", "jeśli"),
    ("między innymi", "włączając"),
    ("nie powinien", "nie może"),
    ("nie powinna", "nie może"),
    // Obligations and rights
    ("powinien", "musi"),
    ("powinna", "musi"),
    ("powinno", "musi"),
    ("powinni", "muszą"),
    ("obowiązek", "musi"),
    ("uprawniony", "ma prawo"),
    ("uprawniona", "ma prawo"),
    ("przysługuje", "ma prawo"),
    ("upoważnia", "daje prawo"),
    ("zabrania", "nie pozwala"),
    ("zakazuje", "nie pozwala"),
    ("dopuszcza", "pozwala"),
    ("odpowiedzialność", "odpowiada za"),
    // Time
    ("następnie", "potem"),
    ("wówczas", "wtedy"),
    // Legislation
    ("ustawa", "prawo"),
    ("ustawy", "praw"),
    ("artykułu", "Art."),
    ("artykuł", "Art."),
    ("paragraf", "§"),
    ("sekcja", "część"),
    ("przepisy", "reguły"),
    ("przepis", "reguła"),
    // Penalties
    ("grzywna", "kara pieniężna"),
    ("sankcja", "kara"),
    ("sankcji", "kary"),
    ("podatek", "opłata rządowa"),
    // Conditions
    ("warunkiem", "wymaganiem"),
    ("warunki", "wymagania"),
    // Entities
    ("podmioty", "organizacje"),
    ("podmiot", "organizacja"),
    ("instytucja", "organizacja"),
    // Consequences
    ("skutki", "efekty"),
    ("skutek", "efekt"),
    ("konsekwencja", "wynik"),
    ("bezprawnie", "nielegalnie"),
    ("bezprawny", "nielegalny"),
    // Connectives
    ("przykładowo", "na przykład"),
    ("zwłaszcza", "szczególnie"),
    ("albo", "lub"),
    ("bądź", "lub"),
    // English fallback
    ("pursuant to", "według"),
    ("notwithstanding", "mimo że"),
    ("aforementioned", "wymieniony wyżej"),
    ("hereby", "tą ustawą"),
    ("shall", "musi"),
    ("wherein", "gdzie"),
    ("thereupon", "potem"),
    ("thereof", "tego"),
];

/// All-caps headings rewritten to title case after substitution.
const HEADING_NORMALISATION: &[(&str, &str)] = &[("ARTYKUŁ", "Artykuł"), ("USTAWA", "Ustawa")];

/// Deterministic, dictionary-driven [`Summarizer`].
#[derive(Debug, Clone)]
pub struct RuleSummarizer {
    table: &'static [(&'static str, &'static str)],
    max_chars: usize,
}

impl Default for RuleSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSummarizer {
    pub fn new() -> Self {
        Self {
            table: REPLACEMENTS,
            max_chars: MAX_SUMMARY_CHARS,
        }
    }

    /// Convert legal text to plain language.
    pub fn simplify(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return EMPTY_INPUT_SUMMARY.to_string();
        }

        let mut simple = text.to_string();
        for (legal, plain) in self.table {
            simple = simple.replace(legal, plain);
            if starts_lowercase(legal) {
                simple = simple.replace(&capitalize(legal), &capitalize(plain));
            }
        }

        for (heading, normalised) in HEADING_NORMALISATION {
            simple = simple.replace(heading, normalised);
        }

        let simple = truncate_at_word(&simple, self.max_chars);
        debug!("Simplified {} chars into {} chars", text.chars().count(), simple.chars().count());
        simple
    }
}

impl Summarizer for RuleSummarizer {
    fn summarize(&self, text: &str) -> String {
        self.simplify(text)
    }
}

fn starts_lowercase(s: &str) -> bool {
    s.chars().next().map_or(false, char::is_lowercase)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cut at the last whitespace at or before `max_chars` and append `...`.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }

    let cut = if chars[max_chars].is_whitespace() {
        max_chars
    } else {
        chars[..max_chars]
            .iter()
            .rposition(|c| c.is_whitespace())
            .unwrap_or(max_chars)
    };

    let kept: String = chars[..cut].iter().collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_returns_sentinel() {
        let summarizer = RuleSummarizer::new();
        assert_eq!(summarizer.simplify(""), EMPTY_INPUT_SUMMARY);
        assert_eq!(summarizer.simplify("   \n\t"), EMPTY_INPUT_SUMMARY);
    }

    #[test]
    fn test_modal_verbs_replaced() {
        let summarizer = RuleSummarizer::new();
        let simplified = summarizer.simplify("Artykuł 1: Niniejszym ustawą osoby powinni mieć prawo.");
        assert!(simplified.contains("muszą"));
        assert!(simplified.starts_with("Art. 1: Tą ustawą"));
    }

    #[test]
    fn test_capitalized_key_gets_capitalized_replacement() {
        let summarizer = RuleSummarizer::new();
        assert_eq!(summarizer.simplify("Grzywna wynosi 100 zł."), "Kara pieniężna wynosi 100 zł.");
        assert_eq!(summarizer.simplify("grzywna wynosi 100 zł."), "kara pieniężna wynosi 100 zł.");
    }

    #[test]
    fn test_phrase_wins_over_contained_word() {
        let summarizer = RuleSummarizer::new();
        assert_eq!(summarizer.simplify("prawo do udziału w zebraniu"), "może uczestniczyć w zebraniu");
        assert_eq!(summarizer.simplify("prawo do sądu"), "może sądu");
        assert_eq!(summarizer.simplify("nie powinien palić"), "nie może palić");
        assert_eq!(summarizer.simplify("treść artykułu 5"), "treść Art. 5");
    }

    #[test]
    fn test_table_orders_containing_keys_first() {
        for (i, (earlier, _)) in REPLACEMENTS.iter().enumerate() {
            for (later, _) in &REPLACEMENTS[i + 1..] {
                assert!(
                    !later.contains(earlier),
                    "{:?} contains {:?} but is applied after it",
                    later,
                    earlier
                );
            }
        }
    }

    #[test]
    fn test_replacements_do_not_feed_later_keys() {
        for (i, (_, plain)) in REPLACEMENTS.iter().enumerate() {
            for (later, _) in &REPLACEMENTS[i + 1..] {
                assert!(
                    !plain.contains(later) && !plain.contains(&capitalize(later)),
                    "replacement {:?} would be rewritten again by {:?}",
                    plain,
                    later
                );
            }
        }
    }

    #[test]
    fn test_heading_normalisation() {
        let summarizer = RuleSummarizer::new();
        assert_eq!(summarizer.simplify("USTAWA z dnia 1"), "Ustawa z dnia 1");
        assert_eq!(summarizer.simplify("ARTYKUŁ 7"), "Artykuł 7");
    }

    #[test]
    fn test_english_fallback_terms() {
        let summarizer = RuleSummarizer::new();
        assert_eq!(summarizer.simplify("The tenant shall pay"), "The tenant musi pay");
        assert_eq!(summarizer.simplify("Notwithstanding clause 2"), "Mimo że clause 2");
    }

    #[test]
    fn test_short_text_not_truncated() {
        let text = "a".repeat(MAX_SUMMARY_CHARS);
        assert_eq!(RuleSummarizer::new().simplify(&text), text);
    }

    #[test]
    fn test_truncates_at_word_boundary() {
        let text = "słowo ".repeat(60);
        let simplified = RuleSummarizer::new().simplify(&text);
        assert!(simplified.ends_with("..."));
        let body = simplified.trim_end_matches("...");
        assert!(body.chars().count() <= MAX_SUMMARY_CHARS);
        assert!(body.ends_with("słowo"));
    }

    #[test]
    fn test_truncates_exactly_at_limit_when_followed_by_space() {
        let mut text = "b".repeat(MAX_SUMMARY_CHARS);
        text.push_str(" tail");
        let simplified = RuleSummarizer::new().simplify(&text);
        assert_eq!(simplified, format!("{}...", "b".repeat(MAX_SUMMARY_CHARS)));
    }

    #[test]
    fn test_unbroken_text_is_hard_cut() {
        let text = "c".repeat(MAX_SUMMARY_CHARS + 50);
        let simplified = RuleSummarizer::new().simplify(&text);
        assert_eq!(simplified.chars().count(), MAX_SUMMARY_CHARS + 3);
    }

    #[test]
    fn test_simplify_is_deterministic() {
        let summarizer = RuleSummarizer::new();
        let text = "Podmiot powinien zapłacić podatek zgodnie z przepisy.";
        assert_eq!(summarizer.simplify(text), summarizer.simplify(text));
    }
}
