//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! Decodes the text following an `&`. Unknown or malformed references are
//! left for the caller to emit literally.

/// Named references recognized by the tokenizer.
///
/// The table is sorted by name so lookups can binary search.
pub const NAMED_CHARACTER_REFERENCES: &[(&str, char)] = &[
    ("AElig", '\u{00C6}'),
    ("Aacute", '\u{00C1}'),
    ("Eacute", '\u{00C9}'),
    ("Ntilde", '\u{00D1}'),
    ("Ouml", '\u{00D6}'),
    ("Uuml", '\u{00DC}'),
    ("aacute", '\u{00E1}'),
    ("acute", '\u{00B4}'),
    ("aelig", '\u{00E6}'),
    ("amp", '&'),
    ("apos", '\''),
    ("bull", '\u{2022}'),
    ("cent", '\u{00A2}'),
    ("copy", '\u{00A9}'),
    ("deg", '\u{00B0}'),
    ("divide", '\u{00F7}'),
    ("eacute", '\u{00E9}'),
    ("egrave", '\u{00E8}'),
    ("euro", '\u{20AC}'),
    ("gt", '>'),
    ("hellip", '\u{2026}'),
    ("iexcl", '\u{00A1}'),
    ("iquest", '\u{00BF}'),
    ("laquo", '\u{00AB}'),
    ("ldquo", '\u{201C}'),
    ("lsquo", '\u{2018}'),
    ("lt", '<'),
    ("mdash", '\u{2014}'),
    ("middot", '\u{00B7}'),
    ("nbsp", '\u{00A0}'),
    ("ndash", '\u{2013}'),
    ("not", '\u{00AC}'),
    ("ntilde", '\u{00F1}'),
    ("ouml", '\u{00F6}'),
    ("para", '\u{00B6}'),
    ("plusmn", '\u{00B1}'),
    ("pound", '\u{00A3}'),
    ("quot", '"'),
    ("raquo", '\u{00BB}'),
    ("rdquo", '\u{201D}'),
    ("reg", '\u{00AE}'),
    ("rsquo", '\u{2019}'),
    ("sect", '\u{00A7}'),
    ("shy", '\u{00AD}'),
    ("times", '\u{00D7}'),
    ("trade", '\u{2122}'),
    ("uuml", '\u{00FC}'),
    ("yen", '\u{00A5}'),
];

/// Names that browsers also accept without the trailing semicolon.
const LEGACY_WITHOUT_SEMICOLON: &[&str] = &["amp", "copy", "gt", "lt", "nbsp", "quot", "reg"];

/// Look up a named reference (without `&` and `;`).
#[must_use]
pub fn lookup_named(name: &str) -> Option<char> {
    NAMED_CHARACTER_REFERENCES
        .binary_search_by(|(candidate, _)| (*candidate).cmp(name))
        .ok()
        .map(|i| NAMED_CHARACTER_REFERENCES[i].1)
}

/// Decode the character reference at the start of `rest`, the input
/// immediately after an `&`.
///
/// Returns the decoded character and the number of bytes of `rest` it
/// consumed, or `None` when the text is not a reference.
///
/// `in_attribute` disables the legacy semicolon-less forms when the next
/// character is alphanumeric or `=`, so that query strings such as
/// `?a=1&copy=2` survive.
#[must_use]
pub fn decode(rest: &str, in_attribute: bool) -> Option<(char, usize)> {
    if let Some(numeric) = rest.strip_prefix('#') {
        return decode_numeric(numeric).map(|(c, len)| (c, len + 1));
    }

    let name_len = rest
        .bytes()
        .take_while(u8::is_ascii_alphanumeric)
        .count();
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];

    // "If there is a match"
    if rest[name_len..].starts_with(';')
        && let Some(c) = lookup_named(name)
    {
        return Some((c, name_len + 1));
    }

    // Legacy references are matched by their longest known prefix.
    let legacy = LEGACY_WITHOUT_SEMICOLON
        .iter()
        .filter(|legacy| name.starts_with(**legacy))
        .max_by_key(|legacy| legacy.len())?;
    let next = rest[legacy.len()..].chars().next();
    if in_attribute && next.is_some_and(|c| c.is_ascii_alphanumeric() || c == '=') {
        return None;
    }
    lookup_named(legacy).map(|c| (c, legacy.len()))
}

/// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
fn decode_numeric(rest: &str) -> Option<(char, usize)> {
    let (digits_start, radix) = match rest.as_bytes().first() {
        Some(b'x' | b'X') => (1, 16),
        _ => (0, 10),
    };
    let digits_len = rest[digits_start..]
        .chars()
        .take_while(|c| c.is_digit(radix))
        .count();
    // "If the character reference has no digits, this is an
    // absence-of-digits-in-numeric-character-reference parse error."
    if digits_len == 0 {
        return None;
    }
    let digits = &rest[digits_start..digits_start + digits_len];
    let mut consumed = digits_start + digits_len;
    if rest[consumed..].starts_with(';') {
        consumed += 1;
    }

    // [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    // "If the number is 0x00 ... greater than 0x10FFFF ... or a surrogate,
    // set the character reference code to 0xFFFD."
    let c = u32::from_str_radix(digits, radix)
        .ok()
        .filter(|&code| code != 0)
        .and_then(char::from_u32)
        .unwrap_or('\u{FFFD}');
    Some((c, consumed))
}
