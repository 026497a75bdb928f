use std::sync::Arc;

use crate::hierarchy::{HierarchyTable, VillageEntry};
use crate::normalize::Normalizer;
use crate::similarity::ratio;

/// Scores must be strictly above this to count as a match.
pub const MATCH_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Found {
        district: String,
        taluka: String,
        village: String,
        score: f64,
    },
    NotFound,
}

impl MatchResult {
    fn found(entry: VillageEntry<'_>, score: f64) -> Self {
        MatchResult::Found {
            district: entry.district.to_string(),
            taluka: entry.taluka.to_string(),
            village: entry.village.to_string(),
            score,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found { .. })
    }

    /// User-facing sentence for this outcome; `query` is echoed on a miss.
    pub fn describe(&self, query: &str) -> String {
        match self {
            MatchResult::Found {
                district,
                taluka,
                village,
                ..
            } => format!("Village '{village}' is in Taluka '{taluka}', District '{district}'."),
            MatchResult::NotFound => format!("Sorry, I couldn't find a match for '{query}'."),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Normalized names scored with [`ratio`].
    #[default]
    Fuzzy,
    /// Case-insensitive equality on trimmed names, no normalization.
    Exact,
}

impl MatchStrategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fuzzy" => Some(MatchStrategy::Fuzzy),
            "exact" => Some(MatchStrategy::Exact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    pub strategy: MatchStrategy,
    pub threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::Fuzzy,
            threshold: MATCH_THRESHOLD,
        }
    }
}

/// Score every village against `query`, normalizing names as it goes.
pub fn resolve(table: &HierarchyTable, normalizer: &Normalizer, query: &str) -> MatchResult {
    let query = normalizer.normalize(query);
    best_match(
        table
            .iter()
            .map(|entry| (entry, normalizer.normalize(entry.village))),
        &query,
        MATCH_THRESHOLD,
    )
}

fn best_match<'a, I, S>(candidates: I, query: &str, threshold: f64) -> MatchResult
where
    I: IntoIterator<Item = (VillageEntry<'a>, S)>,
    S: AsRef<str>,
{
    let mut best: Option<(VillageEntry<'a>, f64)> = None;
    for (entry, normalized) in candidates {
        let score = ratio(query, normalized.as_ref());
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((entry, score));
        }
    }
    match best {
        Some((entry, score)) if score > threshold => MatchResult::found(entry, score),
        _ => MatchResult::NotFound,
    }
}

fn exact_match(table: &HierarchyTable, query: &str) -> MatchResult {
    let query = query.trim().to_lowercase();
    table
        .iter()
        .find(|entry| entry.village.to_lowercase() == query)
        .map_or(MatchResult::NotFound, |entry| MatchResult::found(entry, 100.0))
}

/// Resolver over a loaded table with village names normalized up front.
#[derive(Debug)]
pub struct Resolver {
    table: Arc<HierarchyTable>,
    normalizer: Normalizer,
    config: ResolverConfig,
    normalized: Vec<String>,
}

impl Resolver {
    pub fn new(table: Arc<HierarchyTable>, normalizer: Normalizer, config: ResolverConfig) -> Self {
        let normalized = match config.strategy {
            MatchStrategy::Fuzzy => table
                .iter()
                .map(|entry| normalizer.normalize(entry.village))
                .collect(),
            MatchStrategy::Exact => Vec::new(),
        };
        Self {
            table,
            normalizer,
            config,
            normalized,
        }
    }

    pub fn table(&self) -> &HierarchyTable {
        &self.table
    }

    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    pub fn resolve(&self, query: &str) -> MatchResult {
        match self.config.strategy {
            MatchStrategy::Exact => exact_match(&self.table, query),
            MatchStrategy::Fuzzy => {
                let query = self.normalizer.normalize(query);
                best_match(
                    self.table.iter().zip(&self.normalized),
                    &query,
                    self.config.threshold,
                )
            }
        }
    }
}
