use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use wordnet_morphy::{IdentityLemmatizer, Lemmatizer};

/// Upper bound on repeated lemmatization of one word; exception lists may
/// in principle map forms in a cycle.
const MAX_LEMMA_STEPS: usize = 16;

static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(viii|vii|iii|ii|iv|ix|vi|i|v|x)\b").expect("roman numeral pattern")
});

/// Arabic value of the numerals `i` through `x`; nothing beyond ten.
fn roman_value(token: &str) -> Option<&'static str> {
    Some(match token.to_ascii_lowercase().as_str() {
        "i" => "1",
        "ii" => "2",
        "iii" => "3",
        "iv" => "4",
        "v" => "5",
        "vi" => "6",
        "vii" => "7",
        "viii" => "8",
        "ix" => "9",
        "x" => "10",
        _ => return None,
    })
}

/// Replace whole-word numerals `i`..`x` with `1`..`10`.
pub fn replace_roman_numerals(text: &str) -> Cow<'_, str> {
    ROMAN_NUMERAL.replace_all(text, |caps: &Captures<'_>| {
        roman_value(&caps[1]).unwrap_or(&caps[1]).to_string()
    })
}

/// Canonical form used on both sides of every comparison.
#[derive(Clone)]
pub struct Normalizer {
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(IdentityLemmatizer))
    }
}

impl Normalizer {
    pub fn new(lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        Self { lemmatizer }
    }

    /// Lowercase, turn dashes and dots into spaces, convert Roman numerals,
    /// then lemmatize word by word.
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.trim().to_lowercase().replace(['-', '.'], " ");
        let numbered = replace_roman_numerals(&lowered);
        numbered
            .split_whitespace()
            .map(|word| {
                let lemma = self.settled_lemma(word);
                // A lemma such as "i" must not survive as a numeral.
                match roman_value(&lemma) {
                    Some(value) => value.to_string(),
                    None => lemma,
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lemmatize until the word stops changing, so chains like
    /// "passes" -> "pass" -> "pas" settle in one call.
    fn settled_lemma(&self, word: &str) -> String {
        let mut current = word.to_string();
        for _ in 0..MAX_LEMMA_STEPS {
            let next = self.lemmatizer.lemmatize(&current);
            if next == current {
                break;
            }
            current = next.into_owned();
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordnet_morphy::{Lexicon, Morphy, Pos, WordNetLemmatizer};

    fn wordnet_normalizer() -> Normalizer {
        let lexicon = Lexicon::from_lemmas([
            (Pos::Noun, "village"),
            (Pos::Noun, "sector"),
            (Pos::Noun, "i"),
            (Pos::Noun, "mill"),
        ]);
        Normalizer::new(Arc::new(WordNetLemmatizer::new(lexicon, Morphy::default())))
    }

    fn chained_normalizer() -> Normalizer {
        let lexicon = Lexicon::from_lemmas([
            (Pos::Noun, "pass"),
            (Pos::Noun, "pas"),
            (Pos::Noun, "pa"),
        ]);
        Normalizer::new(Arc::new(WordNetLemmatizer::new(lexicon, Morphy::default())))
    }

    #[test]
    fn converts_only_whole_word_numerals() {
        assert_eq!(replace_roman_numerals("sector iv"), "sector 4");
        assert_eq!(replace_roman_numerals("phase ii block x"), "phase 2 block 10");
        assert_eq!(replace_roman_numerals("xi xx civil vivek"), "xi xx civil vivek");
        assert_eq!(replace_roman_numerals("VIII"), "8");
    }

    #[test]
    fn normalizes_case_punctuation_and_numerals() {
        let normalizer = Normalizer::default();
        let out = normalizer.normalize("Sector-IV");
        assert_eq!(out, "sector 4");
        assert!(out.contains('4'));
        assert_eq!(out, out.to_lowercase());
        assert_eq!(normalizer.normalize("  St. Mary's   Colony "), "st mary's colony");
        assert_eq!(normalizer.normalize("Pocket-XI"), "pocket xi");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn lemmatizes_each_word() {
        let normalizer = wordnet_normalizer();
        assert_eq!(normalizer.normalize("Sectors-III Villages"), "sector 3 village");
        assert_eq!(normalizer.normalize("Rajpur Mills"), "rajpur mill");
    }

    #[test]
    fn numeral_lemmas_are_converted() {
        // "is" reduces to the noun "i", which must not survive as a numeral.
        let normalizer = wordnet_normalizer();
        assert_eq!(normalizer.normalize("is"), "1");
    }

    #[test]
    fn chained_reductions_settle_in_one_pass() {
        let normalizer = chained_normalizer();
        assert_eq!(normalizer.normalize("Passes"), "pa");
        assert_eq!(normalizer.normalize("pass"), "pa");
        assert_eq!(normalizer.normalize("pa"), "pa");
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizers = [
            Normalizer::default(),
            wordnet_normalizer(),
            chained_normalizer(),
        ];
        let inputs = [
            "Sector-IV",
            "Greenfield Villages",
            "  Kh. No. 12-A  ",
            "Phase I.II",
            "is",
            "Pocket XI",
            "Dwarka Sector-X Mills",
            "Passes",
            "Old Pass Road",
        ];
        for normalizer in &normalizers {
            for input in inputs {
                let once = normalizer.normalize(input);
                assert_eq!(normalizer.normalize(&once), once, "input {input:?}");
            }
        }
    }
}
