use strsim::levenshtein;

/// Largest edit distance still offered as a "did you mean" alternative.
pub const MAX_DISTANCE: usize = 2;

/// Candidates within [`MAX_DISTANCE`] of `input`, closest first.
pub fn similar<'a, I>(input: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();
    let mut matches: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|cand| (levenshtein(&input_lower, &cand.to_lowercase()), cand))
        .filter(|(distance, _)| *distance <= MAX_DISTANCE)
        .collect();
    matches.sort();
    matches.dedup_by(|a, b| a.1 == b.1);
    matches.into_iter().map(|(_, c)| c.to_string()).collect()
}
