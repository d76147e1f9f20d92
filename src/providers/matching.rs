//! Picks the registry candidate that corresponds to a catalog artist name.

use super::ArtistCandidate;

/// Lowercases, strips punctuation, drops a leading "the " and collapses
/// whitespace.
pub fn normalize_name(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() {
                Some(' ')
            } else {
                None
            }
        })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let words = match words.split_first() {
        Some((first, rest)) if *first == "the" && !rest.is_empty() => rest,
        _ => &words[..],
    };
    words.join(" ")
}

/// Exact canonical-name match first, then exact alias match, then the
/// highest score. Ties keep provider order.
pub fn best_match<'a>(name: &str, candidates: &'a [ArtistCandidate]) -> Option<&'a ArtistCandidate> {
    let target = normalize_name(name);

    if let Some(exact) = candidates
        .iter()
        .find(|c| normalize_name(&c.name) == target)
    {
        return Some(exact);
    }

    if let Some(alias) = candidates
        .iter()
        .find(|c| c.aliases.iter().any(|a| normalize_name(a) == target))
    {
        return Some(alias);
    }

    candidates
        .iter()
        .fold(None, |best: Option<&ArtistCandidate>, c| match best {
            Some(b) if b.score >= c.score => Some(b),
            _ => Some(c),
        })
}
