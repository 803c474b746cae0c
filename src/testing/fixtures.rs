//! Canned inputs for tests and benchmarks.

/// The two-line scenario used throughout the docs.
#[must_use]
pub fn quick_fox_lines() -> Vec<String> {
    vec!["The quick fox".to_string(), "the Fox jumps".to_string()]
}

/// Encode `n` as a purely alphabetic word (`0 -> a`, `25 -> z`, `26 -> aa`).
///
/// ```
/// use ironreduce::testing::alpha_word;
///
/// assert_eq!(alpha_word(0), "a");
/// assert_eq!(alpha_word(27), "ab");
/// ```
#[must_use]
pub fn alpha_word(mut n: usize) -> String {
    let mut rev = Vec::new();
    loop {
        rev.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    rev.reverse();
    String::from_utf8(rev).unwrap_or_default()
}

/// `n` lines, each holding one distinct alphabetic word.
#[must_use]
pub fn distinct_word_lines(n: usize) -> Vec<String> {
    (0..n).map(alpha_word).collect()
}

/// `n` copies of the same line.
#[must_use]
pub fn repeated_lines(line: &str, n: usize) -> Vec<String> {
    vec![line.to_string(); n]
}

/// A short paragraph with punctuation, digits and mixed case.
#[must_use]
pub fn sample_text() -> Vec<String> {
    [
        "Begin the morning by saying to thyself,",
        "I shall meet with the busy-body, the ungrateful, arrogant, deceitful.",
        "",
        "All these things happen to them by reason of their ignorance (of good and evil).",
        "1234 -- 5678",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}
