//! WordNet-style morphological reduction (morphy) and a lemmatizer on top.
//!
//! Morphy checks the exception lists (`*.exc`) first; when the surface form
//! is a listed exception only the listed lemmas are considered, otherwise the
//! part-of-speech suffix rules generate candidates. Every candidate, the
//! surface form included, must pass a caller-provided lemma existence
//! predicate.
//!
//! [`WordNetLemmatizer`] pairs morphy with a [`Lexicon`] and picks the
//! shortest surviving candidate, falling back to the input word.
//!
//! # Example
//! ```no_run
//! use wordnet_morphy::{Lemmatizer, WordNetLemmatizer};
//!
//! # fn main() -> anyhow::Result<()> {
//! let lemmatizer = WordNetLemmatizer::load("/path/to/wordnet")?;
//! assert_eq!(lemmatizer.lemmatize("villages"), "village");
//! # Ok(()) }
//! ```

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
pub use wordnet_lexicon::{Lexicon, Pos};

/// Where a candidate lemma originated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CandidateSource {
    Surface,
    Exception,
    Rule {
        suffix: &'static str,
        replacement: &'static str,
    },
}

/// A lemma candidate paired with its POS and provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LemmaCandidate<'a> {
    pub pos: Pos,
    pub lemma: Cow<'a, str>,
    pub source: CandidateSource,
}

/// Exception lists plus the fixed suffix rules.
#[derive(Debug, Clone, Default)]
pub struct Morphy {
    exceptions: HashMap<Pos, HashMap<String, Vec<String>>>,
}

impl Morphy {
    /// Load morphy exception lists (`*.exc`) from a WordNet dict directory.
    ///
    /// Files are optional; missing ones are treated as empty.
    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dict_dir.as_ref();
        let mut exceptions = HashMap::new();
        for pos in Pos::ALL {
            let map = load_exc(dir.join(format!("{}.exc", pos.file_stem())))?;
            debug!("loaded {} {pos} exceptions", map.len());
            exceptions.insert(pos, map);
        }
        Ok(Self { exceptions })
    }

    /// Build from literal `(pos, surface, lemmas)` exception entries.
    pub fn from_exceptions<'e, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Pos, &'e str, &'e [&'e str])>,
    {
        let mut exceptions: HashMap<Pos, HashMap<String, Vec<String>>> = HashMap::new();
        for (pos, surface, lemmas) in entries {
            exceptions
                .entry(pos)
                .or_default()
                .insert(normalize(surface), lemmas.iter().map(|l| normalize(l)).collect());
        }
        Self { exceptions }
    }

    /// Generate lemmas for a surface form, returning enriched provenance.
    ///
    /// The callback `lemma_exists` typically delegates to
    /// [`Lexicon::lemma_exists`] so this type stays ignorant of how the lemma
    /// index is stored.
    pub fn lemmas_for<'a, F>(
        &'a self,
        pos: Pos,
        surface: &str,
        lemma_exists: F,
    ) -> Vec<LemmaCandidate<'a>>
    where
        F: Fn(Pos, &str) -> bool,
    {
        let mut seen: HashSet<Cow<'a, str>> = HashSet::new();
        let mut out: Vec<LemmaCandidate<'a>> = Vec::new();
        let norm_surface = normalize(surface);

        if lemma_exists(pos, &norm_surface) {
            push_unique(
                &mut out,
                &mut seen,
                LemmaCandidate {
                    pos,
                    lemma: Cow::Owned(norm_surface.clone()),
                    source: CandidateSource::Surface,
                },
            );
        }

        // A listed exception replaces the rules entirely.
        if let Some(entries) = self
            .exceptions
            .get(&pos)
            .and_then(|exc_map| exc_map.get(&norm_surface))
        {
            for lemma in entries {
                if lemma_exists(pos, lemma) {
                    push_unique(
                        &mut out,
                        &mut seen,
                        LemmaCandidate {
                            pos,
                            lemma: Cow::Borrowed(lemma.as_str()),
                            source: CandidateSource::Exception,
                        },
                    );
                }
            }
            return out;
        }

        for &(suffix, replacement) in rules_for(pos) {
            for candidate in apply_rule(pos, &norm_surface, suffix, replacement) {
                if lemma_exists(pos, &candidate) {
                    push_unique(
                        &mut out,
                        &mut seen,
                        LemmaCandidate {
                            pos,
                            lemma: Cow::Owned(candidate),
                            source: CandidateSource::Rule {
                                suffix,
                                replacement,
                            },
                        },
                    );
                }
            }
        }

        out
    }
}

/// Reduces a single word to its dictionary base form.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize<'w>(&self, word: &'w str) -> Cow<'w, str>;
}

/// Leaves every word untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize<'w>(&self, word: &'w str) -> Cow<'w, str> {
        Cow::Borrowed(word)
    }
}

/// Morphy over a WordNet lexicon, reducing words as a fixed part of speech
/// (noun unless changed with [`WordNetLemmatizer::with_pos`]).
#[derive(Debug, Clone)]
pub struct WordNetLemmatizer {
    lexicon: Lexicon,
    morphy: Morphy,
    pos: Pos,
}

impl WordNetLemmatizer {
    pub fn new(lexicon: Lexicon, morphy: Morphy) -> Self {
        Self {
            lexicon,
            morphy,
            pos: Pos::Noun,
        }
    }

    /// Load both the lemma index and the exception lists from a dict directory.
    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dict_dir.as_ref();
        let lexicon = Lexicon::load(dir)
            .with_context(|| format!("loading lemma index from {}", dir.display()))?;
        let morphy = Morphy::load(dir)
            .with_context(|| format!("loading exceptions from {}", dir.display()))?;
        Ok(Self::new(lexicon, morphy))
    }

    pub fn with_pos(mut self, pos: Pos) -> Self {
        self.pos = pos;
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Shortest candidate lemma for `word` as `pos`, or `None` when morphy
    /// finds nothing in the lexicon.
    pub fn lemma_for(&self, pos: Pos, word: &str) -> Option<String> {
        self.morphy
            .lemmas_for(pos, word, |p, lemma| self.lexicon.lemma_exists(p, lemma))
            .into_iter()
            .min_by_key(|cand| cand.lemma.chars().count())
            .map(|cand| cand.lemma.into_owned())
    }
}

impl Lemmatizer for WordNetLemmatizer {
    fn lemmatize<'w>(&self, word: &'w str) -> Cow<'w, str> {
        match self.lemma_for(self.pos, word) {
            Some(lemma) if lemma != word => Cow::Owned(lemma),
            _ => Cow::Borrowed(word),
        }
    }
}

fn load_exc(path: PathBuf) -> Result<HashMap<String, Vec<String>>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file =
        File::open(&path).with_context(|| format!("open exception file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut map = HashMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let mut parts = line.split_whitespace();
        let surface = match parts.next() {
            Some(s) => normalize(s),
            None => continue,
        };
        let lemmas: Vec<String> = parts.map(normalize).collect();
        if !lemmas.is_empty() {
            map.insert(surface, lemmas);
        }
    }
    Ok(map)
}

fn normalize(text: &str) -> String {
    wordnet_lexicon::normalize_lemma(text)
}

fn push_unique<'a>(
    out: &mut Vec<LemmaCandidate<'a>>,
    seen: &mut HashSet<Cow<'a, str>>,
    candidate: LemmaCandidate<'a>,
) {
    if seen.insert(candidate.lemma.clone()) {
        out.push(candidate);
    }
}

fn apply_rule(pos: Pos, surface: &str, suffix: &str, replacement: &str) -> Vec<String> {
    let Some(stem) = surface.strip_suffix(suffix) else {
        return Vec::new();
    };
    if stem.is_empty() {
        return Vec::new();
    }
    let mut out = vec![format!("{stem}{replacement}")];

    // Verbs double their final consonant before -ing/-ed ("running" -> "runn").
    if pos == Pos::Verb && replacement.is_empty() {
        let mut chars = stem.chars();
        if let (Some(a), Some(b)) = (chars.next_back(), chars.next_back())
            && a == b
        {
            out.push(chars.as_str().to_string() + &a.to_string());
        }
    }

    out
}

fn rules_for(pos: Pos) -> &'static [(&'static str, &'static str)] {
    match pos {
        Pos::Noun => &[
            ("s", ""),
            ("ses", "s"),
            ("xes", "x"),
            ("zes", "z"),
            ("ches", "ch"),
            ("shes", "sh"),
            ("men", "man"),
            ("ies", "y"),
        ],
        Pos::Verb => &[
            ("s", ""),
            ("ies", "y"),
            ("es", "e"),
            ("es", ""),
            ("ed", "e"),
            ("ed", ""),
            ("ing", "e"),
            ("ing", ""),
        ],
        Pos::Adj | Pos::Adv => &[("er", ""), ("er", "e"), ("est", ""), ("est", "e")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_exists(targets: &[(&str, Pos)]) -> impl Fn(Pos, &str) -> bool {
        let set: HashSet<(Pos, String)> = targets
            .iter()
            .map(|(lemma, pos)| (*pos, normalize(lemma)))
            .collect();
        move |pos, lemma| set.contains(&(pos, normalize(lemma)))
    }

    #[test]
    fn exceptions_short_circuit_rules() {
        let morph = Morphy::from_exceptions([(Pos::Noun, "axes", &["ax", "axis"][..])]);
        let candidates = morph.lemmas_for(
            Pos::Noun,
            "axes",
            fake_exists(&[("ax", Pos::Noun), ("axis", Pos::Noun), ("axe", Pos::Noun)]),
        );
        let lemmas: Vec<&str> = candidates.iter().map(|c| c.lemma.as_ref()).collect();
        assert_eq!(lemmas, vec!["ax", "axis"]);
        assert!(
            candidates
                .iter()
                .all(|c| c.source == CandidateSource::Exception)
        );
    }

    #[test]
    fn includes_surface_and_rule_hits() {
        let morph = Morphy::default();
        let candidates = morph.lemmas_for(
            Pos::Verb,
            "running",
            fake_exists(&[("running", Pos::Verb), ("run", Pos::Verb)]),
        );
        assert_eq!(candidates.len(), 2);
        assert!(matches!(candidates[0].source, CandidateSource::Surface));
        assert!(matches!(candidates[1].source, CandidateSource::Rule { .. }));
    }

    #[test]
    fn noun_rules_keep_double_letters() {
        let morph = Morphy::default();
        let candidates = morph.lemmas_for(Pos::Noun, "mills", fake_exists(&[("mill", Pos::Noun)]));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].lemma, "mill");
    }

    #[test]
    fn lemmatizer_prefers_shortest_candidate() {
        let lexicon = Lexicon::from_lemmas([(Pos::Noun, "glasses"), (Pos::Noun, "glass")]);
        let lemmatizer = WordNetLemmatizer::new(lexicon, Morphy::default());
        assert_eq!(lemmatizer.lemmatize("glasses"), "glass");
        assert_eq!(lemmatizer.lemmatize("glass"), "glass");
    }

    #[test]
    fn lemmatizer_returns_unknown_words_unchanged() {
        let lemmatizer = WordNetLemmatizer::new(Lexicon::default(), Morphy::default());
        assert!(matches!(lemmatizer.lemmatize("khera"), Cow::Borrowed("khera")));
        assert_eq!(IdentityLemmatizer.lemmatize("villages"), "villages");
    }
}
