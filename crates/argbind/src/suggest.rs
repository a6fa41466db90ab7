//! "Did you mean" hints for unknown options and subcommands.

use strsim::levenshtein;

/// Closest candidate within an edit distance of 2, falling back to a
/// candidate that extends `input` as a prefix.
pub(crate) fn closest<'a, I>(input: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, usize)> = None;
    let mut prefixed: Option<&str> = None;

    for candidate in candidates {
        let distance = levenshtein(input, candidate);
        if distance <= 2 && best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
        if prefixed.is_none() && !input.is_empty() && candidate.starts_with(input) {
            prefixed = Some(candidate);
        }
    }

    best.map(|(c, _)| c).or(prefixed)
}

#[cfg(test)]
mod tests {
    use super::closest;

    #[test]
    fn picks_smallest_distance() {
        let names = ["level", "label", "verbose"];
        assert_eq!(closest("levle", names), Some("level"));
        assert_eq!(closest("verbos", names), Some("verbose"));
    }

    #[test]
    fn falls_back_to_prefix() {
        assert_eq!(closest("conf", ["configuration"]), Some("configuration"));
        assert_eq!(closest("zzz", ["configuration"]), None);
    }
}
