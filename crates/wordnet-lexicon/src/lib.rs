//! Lemma lists read from WordNet `index.*` files.
//!
//! Only the first column of each index line (the lemma) is kept, keyed by
//! part of speech. That is all a morphological reducer needs to decide whether
//! a candidate base form is a real dictionary word.
//!
//! ```no_run
//! use wordnet_lexicon::{Lexicon, Pos};
//!
//! # fn main() -> anyhow::Result<()> {
//! let lexicon = Lexicon::load("/path/to/wordnet")?;
//! assert!(lexicon.lemma_exists(Pos::Noun, "village"));
//! # Ok(()) }
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Part-of-speech marker as used by WordNet files (`n`, `v`, `a`/`s`, `r`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Pos {
    Noun,
    Verb,
    Adj,
    Adv,
}

impl Pos {
    pub const ALL: [Pos; 4] = [Pos::Noun, Pos::Verb, Pos::Adj, Pos::Adv];

    /// Parse a WordNet POS character into an enum.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Pos::Noun),
            'v' => Some(Pos::Verb),
            'a' | 's' => Some(Pos::Adj),
            'r' => Some(Pos::Adv),
            _ => None,
        }
    }

    /// Suffix used by the dictionary file names (`index.noun`, `noun.exc`).
    pub fn file_stem(self) -> &'static str {
        match self {
            Pos::Noun => "noun",
            Pos::Verb => "verb",
            Pos::Adj => "adj",
            Pos::Adv => "adv",
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Set of known lemmas per part of speech.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    lemmas: HashMap<Pos, HashSet<String>>,
}

impl Lexicon {
    /// Load `index.noun`, `index.verb`, `index.adj` and `index.adv` from a
    /// WordNet dict directory.
    ///
    /// Files are optional; missing ones leave that part of speech empty.
    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dict_dir.as_ref();
        let mut lemmas = HashMap::new();
        for pos in Pos::ALL {
            let path = dir.join(format!("index.{}", pos.file_stem()));
            if !path.exists() {
                continue;
            }
            let text = fs::read_to_string(&path)
                .with_context(|| format!("read index file {}", path.display()))?;
            let parsed = parse_index(&text)
                .with_context(|| format!("parse index file {}", path.display()))?;
            lemmas.insert(pos, parsed);
        }
        if lemmas.is_empty() {
            bail!("no WordNet index files found in {}", dir.display());
        }
        Ok(Self { lemmas })
    }

    /// Build a lexicon from literal lemma lists.
    pub fn from_lemmas<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Pos, &'a str)>,
    {
        let mut lemmas: HashMap<Pos, HashSet<String>> = HashMap::new();
        for (pos, lemma) in entries {
            lemmas.entry(pos).or_default().insert(normalize_lemma(lemma));
        }
        Self { lemmas }
    }

    pub fn lemma_exists(&self, pos: Pos, lemma: &str) -> bool {
        self.lemmas
            .get(&pos)
            .is_some_and(|set| set.contains(&normalize_lemma(lemma)))
    }

    /// Number of lemmas known for `pos`.
    pub fn len(&self, pos: Pos) -> usize {
        self.lemmas.get(&pos).map_or(0, HashSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.values().all(HashSet::is_empty)
    }
}

fn parse_index(text: &str) -> Result<HashSet<String>> {
    let mut set = HashSet::new();
    for (lineno, line) in text.lines().enumerate() {
        // License header lines are indented.
        if line.is_empty() || line.starts_with([' ', '\t']) {
            continue;
        }
        let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
        if tokens.len() < 6 {
            bail!("line {}: malformed index line (too few tokens)", lineno + 1);
        }
        set.insert(normalize_lemma(tokens[0]));
    }
    Ok(set)
}

/// Canonical lemma key: trimmed, lowercase, spaces joined with `_`.
pub fn normalize_lemma(text: &str) -> String {
    text.trim().to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pos_chars() {
        assert_eq!(Pos::from_char('n'), Some(Pos::Noun));
        assert_eq!(Pos::from_char('s'), Some(Pos::Adj));
        assert_eq!(Pos::from_char('x'), None);
        assert_eq!(Pos::Verb.to_string(), "verb");
    }

    #[test]
    fn skips_license_header_and_keeps_lemmas() {
        let text = "  1 This software and database is being provided\n\
                    village n 1 1 @ 1 0 08672738\n\
                    market_town n 1 1 @ 1 0 08672199\n";
        let set = parse_index(text).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("village"));
        assert!(set.contains("market_town"));
    }

    #[test]
    fn rejects_truncated_lines() {
        let err = parse_index("village n 1\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn lookups_are_case_and_space_insensitive() {
        let lexicon = Lexicon::from_lemmas([(Pos::Noun, "Market Town")]);
        assert!(lexicon.lemma_exists(Pos::Noun, "market town"));
        assert!(lexicon.lemma_exists(Pos::Noun, "MARKET_TOWN"));
        assert!(!lexicon.lemma_exists(Pos::Verb, "market town"));
        assert_eq!(lexicon.len(Pos::Noun), 1);
        assert_eq!(lexicon.len(Pos::Adv), 0);
    }
}
