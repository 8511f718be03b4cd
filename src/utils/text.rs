//! ASCII folding for text that ends up in HTTP headers and PDF strings.

use unicode_normalization::UnicodeNormalization;

/// Strip accents and replace letters that do not decompose.
///
/// # Examples
///
/// ```
/// use contribmod::utils::fold_accents;
///
/// assert_eq!(fold_accents("Schrödinger"), "Schrodinger");
/// assert_eq!(fold_accents("Łukasz Ørsted"), "Lukasz Orsted");
/// ```
pub fn fold_accents(text: &str) -> String {
    replace_special_chars(text)
        // NFD splits "é" into "e" + combining acute accent
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Characters that are distinct letters rather than accented versions of ASCII ones
fn replace_special_chars(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'Ł' => 'L',
            'ł' => 'l',
            'Ø' => 'O',
            'ø' => 'o',
            'Æ' => 'A',
            'æ' => 'a',
            'ß' => 's',
            'Ð' | 'Đ' => 'D',
            'ð' | 'đ' => 'd',
            'Þ' => 'T',
            'þ' => 't',
            'ı' => 'i',
            // Typographic quotes and dashes
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            _ => c,
        })
        .collect()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |
        '\u{1AB0}'..='\u{1AFF}' |
        '\u{1DC0}'..='\u{1DFF}' |
        '\u{20D0}'..='\u{20FF}' |
        '\u{FE20}'..='\u{FE2F}'
    )
}

/// Fold to printable ASCII: accents stripped, control characters turned into spaces,
/// anything else outside ASCII replaced by `replacement`.
pub fn to_printable_ascii(text: &str, replacement: char) -> String {
    fold_accents(text)
        .chars()
        .map(|c| {
            if c.is_control() {
                ' '
            } else if c.is_ascii() {
                c
            } else {
                replacement
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("José García"), "Jose Garcia");
        assert_eq!(fold_accents("Zürich"), "Zurich");
        assert_eq!(fold_accents("Nguyễn"), "Nguyen");
        assert_eq!(fold_accents("Łódź"), "Lodz");
    }

    #[test]
    fn test_printable_ascii() {
        assert_eq!(to_printable_ascii("a\tb\nc", '_'), "a b c");
        assert_eq!(to_printable_ascii("量子 talk", '_'), "__ talk");
        assert_eq!(to_printable_ascii("“quoted” – text", '?'), "\"quoted\" - text");
    }
}
