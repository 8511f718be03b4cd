use super::text::to_printable_ascii;

/// Make a filename safe for a quoted `Content-Disposition` header parameter.
///
/// Line breaks and other control characters become spaces, characters that would end
/// or escape the quoted value are dropped, accents are folded and remaining non-ASCII
/// characters become `_`. Whitespace runs collapse to a single space.
///
/// # Examples
///
/// ```
/// use contribmod::utils::sanitize_header_filename;
///
/// assert_eq!(
///     sanitize_header_filename("A \"quoted\"\r\ntitle - contribution.xml"),
///     "A quoted title - contribution.xml"
/// );
/// ```
pub fn sanitize_header_filename(name: &str) -> String {
    let cleaned: String = to_printable_ascii(name, '_')
        .chars()
        .filter(|c| !matches!(c, '"' | '\\' | ';'))
        .collect();

    let collapsed = cleaned.split_whitespace().collect::<Vec<&str>>().join(" ");
    if collapsed.is_empty() {
        "download".to_string()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_and_newlines() {
        assert_eq!(
            sanitize_header_filename("Say \"hi\"\nthere - contribution.xml"),
            "Say hi there - contribution.xml"
        );
    }

    #[test]
    fn test_header_breaking_characters() {
        let name = sanitize_header_filename("evil\r\nSet-Cookie: a=b; c\\d.pdf");
        assert!(!name.contains('\r'));
        assert!(!name.contains('\n'));
        assert!(!name.contains(';'));
        assert!(!name.contains('\\'));
        assert_eq!(name, "evil Set-Cookie: a=b cd.pdf");
    }

    #[test]
    fn test_non_ascii() {
        assert_eq!(
            sanitize_header_filename("Schrödinger's 猫.pdf"),
            "Schrodinger's _.pdf"
        );
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(sanitize_header_filename("\"\n\""), "download");
    }
}
