//! Character-level ratio similarity.
//!
//! The score is the indel similarity `(|a| + |b| - indel(a, b)) / (|a| + |b|)`
//! scaled to 0..=100, where `indel` counts insertions and deletions only.
//! Since `indel = |a| + |b| - 2 * lcs`, this is computed from the longest
//! common subsequence. It agrees with `rapidfuzz::fuzz::ratio`.

/// Similarity of `a` and `b` in `0.0..=100.0`; 0 when either side is empty.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let total = a.len() + b.len();
    // Multiply before dividing so that exact fractions like 80/100 stay exact.
    (200 * lcs_len(&a, &b)) as f64 / total as f64
}

/// Insertions plus deletions needed to turn `a` into `b`.
pub fn indel_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    a.len() + b.len() - 2 * lcs_len(&a, &b)
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; short.len() + 1];
    let mut curr = vec![0usize; short.len() + 1];
    for &x in long {
        for (j, &y) in short.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(ratio("greenfield village", "greenfield village"), 100.0);
    }

    #[test]
    fn empty_side_scores_zero() {
        assert_eq!(ratio("", ""), 0.0);
        assert_eq!(ratio("abc", ""), 0.0);
        assert_eq!(ratio("", "abc"), 0.0);
    }

    #[test]
    fn is_symmetric() {
        let pairs = [("kitten", "sitting"), ("narela", "nerala"), ("alipur", "alipur khurd")];
        for (a, b) in pairs {
            assert_eq!(ratio(a, b), ratio(b, a));
        }
    }

    #[test]
    fn known_distances() {
        assert_eq!(indel_distance("kitten", "sitting"), 5);
        assert_eq!(indel_distance("abc", "abc"), 0);
        assert_eq!(indel_distance("abc", ""), 3);
        // One substitution costs a deletion plus an insertion.
        assert_eq!(indel_distance("abcde", "abcdf"), 2);
    }

    #[test]
    fn exact_eighty() {
        assert_eq!(ratio("abcde", "abcdf"), 80.0);
    }

    #[test]
    fn one_missing_character_stays_high() {
        let score = ratio("greenfield villag", "greenfield village");
        assert!(score > 97.0 && score < 100.0, "score {score}");
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert_eq!(ratio("दिल्ली", "दिल्ली"), 100.0);
        assert_eq!(indel_distance("é", "e"), 2);
    }
}
