//! Fixation length of a word.

/// Share of a word's characters that forms its fixation.
pub const FIXATION_RATIO: f64 = 0.5;

/// Returns the number of leading characters of `word` to emphasize.
///
/// The length is counted in characters, so multi-byte letters weigh the same as ASCII ones. The
/// result never exceeds the character count of `word`; the empty string yields `0`.
pub fn fixation_length(word: &str) -> usize {
    let chars = word.chars().count();
    (chars as f64 * FIXATION_RATIO).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::fixation_length;

    #[test]
    fn matches_half_rounded_up() {
        assert_eq!(fixation_length(""), 0);
        assert_eq!(fixation_length("a"), 1);
        assert_eq!(fixation_length("to"), 1);
        assert_eq!(fixation_length("read"), 2);
        assert_eq!(fixation_length("books"), 3);
        assert_eq!(fixation_length("reading"), 4);
    }

    #[test]
    fn never_exceeds_word_length() {
        for word in ["", "x", "ab", "abc", "abcdefghijklmnopqrstuvwxyz"] {
            assert!(fixation_length(word) <= word.chars().count());
        }
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(fixation_length("über"), 2);
        assert_eq!(fixation_length("naïveté"), 4);
    }
}
