use super::types::Classification;

/// Parse a raw model response into one verdict per word.
///
/// The response is expected to be one "true"/"false" line per word, in
/// word order. Matching is positional: line N answers word N, and a line
/// that is neither "true" nor "false" yields `Unknown` for that position
/// without shifting the lines after it. Missing lines pad the tail with
/// `Unknown`; extra lines are ignored. The result always has exactly
/// `batch_len` entries.
pub fn parse_batch_response(text: &str, batch_len: usize) -> Vec<Classification> {
    let mut results: Vec<Classification> = text
        .trim()
        .lines()
        .take(batch_len)
        .map(|line| {
            let cleaned = line.trim().to_lowercase();
            if cleaned.contains("true") {
                Classification::Excluded
            } else if cleaned.contains("false") {
                Classification::Valid
            } else {
                Classification::Unknown
            }
        })
        .collect();

    results.resize(batch_len, Classification::Unknown);
    results
}
