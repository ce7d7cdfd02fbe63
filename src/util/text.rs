use std::borrow::Cow;

/// U+00AD SOFT HYPHEN. Publishers sprinkle it into long German compounds as a
/// line-break hint; it must never reach feed text.
pub const SOFT_HYPHEN: char = '\u{00ad}';

/// Removes every soft hyphen from `s`.
///
/// Returns `Cow::Borrowed` when there is nothing to remove, so clean cells
/// cost no allocation.
///
/// # Examples
///
/// ```
/// use fusion2feed::util::strip_soft_hyphens;
///
/// assert_eq!(strip_soft_hyphens("Zusammen\u{ad}schluss"), "Zusammenschluss");
/// assert_eq!(strip_soft_hyphens("plain"), "plain");
/// ```
pub fn strip_soft_hyphens(s: &str) -> Cow<'_, str> {
    if !s.contains(SOFT_HYPHEN) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|&c| c != SOFT_HYPHEN).collect())
}

/// Whether `c` is allowed in an XML 1.0 document (the `Char` production).
///
/// Surrogates cannot occur in a `char`, so only the C0 controls other than
/// tab, line feed and carriage return, plus U+FFFE and U+FFFF, are excluded.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{fffd}' | '\u{10000}'..='\u{10ffff}')
}

/// Replaces characters XML 1.0 cannot carry with U+FFFD.
///
/// Entities such as `&#1;` survive HTML parsing as raw control characters;
/// written unchanged they make the output unreadable to strict XML parsers.
///
/// ```
/// use fusion2feed::util::xml_safe;
///
/// assert_eq!(xml_safe("ID\u{1}7"), "ID\u{fffd}7");
/// assert_eq!(xml_safe("tab\tok"), "tab\tok");
/// ```
pub fn xml_safe(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.chars()
            .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_text_returns_borrowed() {
        let input = "Erwerb sämtlicher Anteile";
        let result = strip_soft_hyphens(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_removes_every_soft_hyphen() {
        let result = strip_soft_hyphens("\u{ad}Kraft\u{ad}fahr\u{ad}zeug\u{ad}");
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(result, "Kraftfahrzeug");
    }

    #[test]
    fn test_keeps_hard_hyphens_and_whitespace() {
        assert_eq!(
            strip_soft_hyphens("B1-12/23\n\tHol\u{ad}ding"),
            "B1-12/23\n\tHolding"
        );
    }

    #[test]
    fn test_only_soft_hyphens_yields_empty() {
        assert_eq!(strip_soft_hyphens("\u{ad}\u{ad}"), "");
    }

    #[test]
    fn test_xml_safe_clean_text_returns_borrowed() {
        let input = "Zusammenschluss\r\n\tB1-12/23 \u{e000} \u{1f600}";
        assert!(matches!(xml_safe(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_xml_safe_replaces_forbidden_characters() {
        assert_eq!(
            xml_safe("\u{0}a\u{8}b\u{b}c\u{c}d\u{1f}e\u{fffe}f\u{ffff}"),
            "\u{fffd}a\u{fffd}b\u{fffd}c\u{fffd}d\u{fffd}e\u{fffd}f\u{fffd}"
        );
    }

    #[test]
    fn test_is_xml_char_boundaries() {
        assert!(!is_xml_char('\u{1f}'));
        assert!(is_xml_char('\u{20}'));
        assert!(is_xml_char('\u{d7ff}'));
        assert!(is_xml_char('\u{fffd}'));
        assert!(!is_xml_char('\u{fffe}'));
        assert!(is_xml_char('\u{10000}'));
        assert!(is_xml_char('\u{10ffff}'));
    }

    /// Arbitrary text with soft hyphens mixed in at a high rate.
    fn hyphenated_text() -> impl Strategy<Value = String> {
        proptest::collection::vec(prop_oneof![Just(SOFT_HYPHEN), any::<char>()], 0..64)
            .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_output_never_contains_soft_hyphen(s in hyphenated_text()) {
            let out = strip_soft_hyphens(&s);
            prop_assert!(!out.contains(SOFT_HYPHEN));
        }

        #[test]
        fn prop_xml_safe_output_is_all_xml_chars(s in any::<String>()) {
            prop_assert!(xml_safe(&s).chars().all(is_xml_char));
        }

        #[test]
        fn prop_other_characters_survive_in_order(s in hyphenated_text()) {
            let expected: String = s.chars().filter(|&c| c != SOFT_HYPHEN).collect();
            prop_assert_eq!(strip_soft_hyphens(&s).into_owned(), expected);
        }
    }
}
