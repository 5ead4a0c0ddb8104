//! Cleans raw completion text into a single display paragraph.
//!
//! `normalize` is idempotent: running it on its own output changes nothing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TEXT_BLOCK: Regex = Regex::new(r#"text="([^"]+)""#).unwrap();
    static ref LINE_BREAKS: Regex = Regex::new(r"\r\n|\r|\n|\u{2028}|\u{2029}").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const WRAPPER_MARKER: &str = "TextBlock";
const WRAPPER_PREFIXES: &[&str] = &["TextBlock(text=\"", "TextBlock(text='"];
const WRAPPER_SUFFIXES: &[&str] = &["\")", "')"];

/// Windows-1252 characters in the 0x80..=0x9F range, keyed by byte.
const CP1252: &[(u8, char)] = &[
    (0x80, '€'),
    (0x82, '‚'),
    (0x83, 'ƒ'),
    (0x84, '„'),
    (0x85, '…'),
    (0x86, '†'),
    (0x87, '‡'),
    (0x88, 'ˆ'),
    (0x89, '‰'),
    (0x8A, 'Š'),
    (0x8B, '‹'),
    (0x8C, 'Œ'),
    (0x8E, 'Ž'),
    (0x91, '‘'),
    (0x92, '’'),
    (0x93, '“'),
    (0x94, '”'),
    (0x95, '•'),
    (0x96, '–'),
    (0x97, '—'),
    (0x98, '˜'),
    (0x99, '™'),
    (0x9A, 'š'),
    (0x9B, '›'),
    (0x9C, 'œ'),
    (0x9E, 'ž'),
    (0x9F, 'Ÿ'),
];

/// Lead characters that UTF-8 mojibake starts with: `Â`/`Ã` for Latin-1
/// letters and symbols, `Ð`/`Ñ` for Cyrillic, `â` for punctuation and `ð`
/// for emoji. Other accented capitals are taken as genuine text.
const MOJIBAKE_LEADS: &[char] = &['Â', 'Ã', 'Ð', 'Ñ', 'â', 'ð'];

pub fn normalize(raw: &str) -> String {
    let mut text = raw.to_string();

    if text.contains(WRAPPER_MARKER) {
        if let Some(inner) = TEXT_BLOCK.captures(&text).and_then(|c| c.get(1)) {
            text = inner.as_str().to_string();
        }
    }

    let text = repair_mojibake(&text);
    let text = strip_wrappers(&text);
    let text = LINE_BREAKS.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Undoes UTF-8 text that was decoded as Latin-1 or Windows-1252, repeatedly,
/// so doubly-garbled text is repaired too.
pub fn repair_mojibake(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let repaired = repair_pass(&current);
        if repaired == current {
            return current;
        }
        current = repaired;
    }
}

fn repair_pass(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        match decode_at(&chars[i..]) {
            Some((decoded, used)) => {
                out.push(decoded);
                i += used;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

/// Decodes one multi-byte UTF-8 sequence spelled out as single-byte chars,
/// when it starts with a recognised mojibake lead.
fn decode_at(chars: &[char]) -> Option<(char, usize)> {
    let first = *chars.first()?;
    if !MOJIBAKE_LEADS.contains(&first) {
        return None;
    }
    let lead = as_byte(first)?;
    let len = match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };
    let bytes = chars
        .get(..len)?
        .iter()
        .map(|c| as_byte(*c))
        .collect::<Option<Vec<u8>>>()?;
    let decoded = std::str::from_utf8(&bytes).ok()?.chars().next()?;
    Some((decoded, len))
}

fn as_byte(c: char) -> Option<u8> {
    let code = c as u32;
    if (0x80..=0xFF).contains(&code) {
        return Some(code as u8);
    }
    CP1252.iter().find(|(_, ch)| *ch == c).map(|(byte, _)| *byte)
}

fn strip_wrappers(text: &str) -> String {
    let mut current = text.trim();
    loop {
        let before = current;
        for prefix in WRAPPER_PREFIXES {
            if let Some(rest) = current.strip_prefix(prefix) {
                current = rest.trim();
            }
        }
        for suffix in WRAPPER_SUFFIXES {
            if let Some(rest) = current.strip_suffix(suffix) {
                current = rest.trim();
            }
        }
        if current == before {
            return current.to_string();
        }
    }
}

/// Removes the leading publication attribution ("<pub> reports that",
/// "<pub> carries ...") for pasting the summary elsewhere.
pub fn strip_attribution(summary: &str, publication: &str) -> String {
    let summary = summary.trim();
    let publication = publication.trim();
    if publication.is_empty() {
        return summary.to_string();
    }

    let Some(rest) = strip_prefix_ignore_case(summary, publication) else {
        return summary.to_string();
    };
    let rest = rest.trim_start();
    let rest = ["reports that ", "reports ", "carries "]
        .iter()
        .find_map(|verb| strip_prefix_ignore_case(rest, verb))
        .map(str::trim_start);

    match rest {
        Some(rest) if !rest.is_empty() => capitalise(rest),
        _ => summary.to_string(),
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
