//! Fuzzy name matching for "did you mean" suggestions.
//!
//! Implements the similar-name search described by the diagnostic engine:
//! Levenshtein distance with threshold `max(3, len/2)`, with a candidate also
//! admitted if it shares a four-character prefix or suffix with the target
//! (case-insensitive). Results are sorted by distance and capped at three.

/// A scope-declared name the analyzer can compare a misspelled reference against.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub declared_line: usize,
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());
    if n == 0 {
        return m;
    }
    if m == 0 {
        return n;
    }
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; m + 1];
    for i in 1..=n {
        curr[0] = i;
        for j in 1..=m {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m]
}

fn shares_prefix_or_suffix(a: &str, b: &str) -> bool {
    const LEN: usize = 4;
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.len() < LEN || b.len() < LEN {
        return false;
    }
    a[..LEN] == b[..LEN] || a[a.len() - LEN..] == b[b.len() - LEN..]
}

/// Return up to three candidates similar to `target`, nearest first.
pub fn find_similar<'a>(target: &str, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
    let threshold = (target.chars().count() / 2).max(3);
    let mut scored: Vec<(usize, &Candidate)> = candidates
        .iter()
        .filter_map(|c| {
            let distance = levenshtein(target, &c.name);
            if distance <= threshold || shares_prefix_or_suffix(target, &c.name) {
                Some((distance, c))
            } else {
                None
            }
        })
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);
    scored.into_iter().take(3).map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(name: &str, line: usize) -> Candidate {
        Candidate { name: name.to_string(), declared_line: line }
    }

    #[test]
    fn finds_one_edit_away() {
        let candidates = vec![cand("username", 1), cand("count", 2)];
        let found = find_similar("usernam", &candidates);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "username");
    }

    #[test]
    fn caps_at_three_sorted_by_distance() {
        let candidates = vec![cand("alpha", 1), cand("alpq", 2), cand("alp", 3), cand("zzzzzzzz", 4)];
        let found = find_similar("alph", &candidates);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|c| c.name != "zzzzzzzz"));
    }

    #[test]
    fn no_match_beyond_threshold() {
        let candidates = vec![cand("completely_unrelated_name", 1)];
        assert!(find_similar("x", &candidates).is_empty());
    }
}
