//! Fixes for systematic Tesseract misreads.
//!
//! The game font makes a handful of glyphs ambiguous between digits and
//! letters. Each field knows which alphabet it expects, so the fix is a plain
//! per-character substitution toward that alphabet.

/// Corrects digits misread in a field that only holds letters.
pub fn nums_to_letters(src: &str) -> String {
    src.chars()
        .map(|c| match c {
            '1' => 'l',
            '0' => 'o',
            '5' => 's',
            '2' => 'z',
            other => other,
        })
        .collect()
}

/// Corrects letters misread in a field that only holds digits, then drops
/// everything that still isn't a digit.
pub fn letters_to_nums(src: &str) -> String {
    src.chars()
        .map(|c| match c {
            'S' | 's' => '5',
            'O' | 'o' => '0',
            'l' | 'I' | 'i' => '1',
            'Z' => '2',
            other => other,
        })
        .filter(|c| c.is_ascii_digit())
        .collect()
}

/// Drops the first or the last space-separated word.
///
/// Candy labels read "<Species> Candy" in most languages but "Bonbon <Species>"
/// in French, Spanish and Italian. Input without a space is returned as is.
pub fn remove_first_or_last_word(src: &str, remove_first: bool) -> &str {
    if remove_first {
        match src.find(' ') {
            Some(i) => &src[i + 1..],
            None => src,
        }
    } else {
        match src.rfind(' ') {
            Some(i) => &src[..i],
            None => src,
        }
    }
}

/// Parses a digit-only field after [`letters_to_nums`].
pub fn parse_digits(src: &str) -> Option<u32> {
    letters_to_nums(src).parse().ok()
}
