/// Splits a byte buffer into term counts.
///
/// A term is a maximal run of ASCII alphanumeric bytes with length greater
/// than 2. Everything else is a separator. Matching is case-sensitive and
/// no normalization is applied; the trailing partial run at end-of-buffer
/// is emitted by the same rule as any other run.
pub fn tokenize(buf: &[u8]) -> std::collections::HashMap<String, i64> {
    let mut counts: std::collections::HashMap<String, i64> = std::collections::HashMap::new();
    let mut current: Vec<u8> = Vec::new();

    let mut flush = |current: &mut Vec<u8>, counts: &mut std::collections::HashMap<String, i64>| {
        if current.len() > 2 {
            // The buffer is only ever fed alphanumeric ASCII bytes, so this
            // can't fail; non-ASCII/non-UTF8 input is treated as a
            // separator before it ever reaches `current`.
            if let Ok(word) = String::from_utf8(current.clone()) {
                *counts.entry(word).or_insert(0) += 1;
            }
        }
        current.clear();
    };

    for &byte in buf {
        if byte.is_ascii_alphanumeric() {
            current.push(byte);
        } else {
            flush(&mut current, &mut counts);
        }
    }
    flush(&mut current, &mut counts);

    counts
}
