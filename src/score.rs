/// Score how much some bytes look like English text.
///
/// The score is the ratio of letters and spaces to everything else, with
/// small offsets so that empty input and input without "other" bytes stay
/// finite. It only ranks candidates against each other; a high score is no
/// proof of a correct decryption.
pub fn english_score(bytes: &[u8]) -> f64 {
    let letters = bytes
        .iter()
        .filter(|b| **b == b' ' || b.is_ascii_alphabetic())
        .count();
    let others = bytes.len() - letters;
    (letters as f64 + 0.1) / (others as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(b"", 0.1)]
    #[case(b"ab c", 4.1)]
    #[case(b"a\x00", 0.55)]
    fn english_score_counts_letters_against_other_bytes(
        #[case] input: &[u8],
        #[case] expected: f64,
    ) {
        assert!((english_score(input) - expected).abs() < 1e-12);
    }

    #[test]
    fn english_score_prefers_text_over_noise() {
        let text = b"Now that the party is jumping";
        let noise = b"\x1b\x37\x37\x33\x31\x36\x3f\x78\x15\x1b\x7f\x2b";

        assert!(english_score(text) > english_score(noise));
    }

    #[test]
    fn english_score_is_deterministic() {
        let text = b"Cooking MC's like a pound of bacon";

        assert_eq!(english_score(text), english_score(text));
    }
}
