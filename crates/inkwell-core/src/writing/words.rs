/// Number of whitespace-separated words in `text`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in characters, the unit gauge growth is measured in.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_ignoring_padding() {
        assert_eq!(count_words("  hello   world  "), 2);
        assert_eq!(count_words("one\ttwo\nthree"), 3);
    }

    #[test]
    fn blank_text_has_no_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words(" \n\t "), 0);
    }

    #[test]
    fn chars_not_bytes() {
        assert_eq!(char_count("café"), 4);
    }
}
