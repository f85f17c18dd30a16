//! Markup to text-line reconstruction.
//!
//! The monitor page is not parsed as a DOM. Block-level boundaries become
//! newlines, everything else is stripped, and the caller receives plain
//! lines in document order.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid script/style pattern")
});
static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid br pattern"));
static BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(?:p|div|tr|td|th|li|h[1-6])\s*>").expect("valid block close pattern")
});
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([A-Za-z][A-Za-z0-9]{1,31}))(;?)")
        .expect("valid entity pattern")
});

/// Names for U+00A0 through U+00FF, in code point order
const LATIN1_NAMES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy",
    "ordf", "laquo", "not", "shy", "reg", "macr", "deg", "plusmn", "sup2", "sup3", "acute",
    "micro", "para", "middot", "cedil", "sup1", "ordm", "raquo", "frac14", "frac12",
    "frac34", "iquest", "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig",
    "Ccedil", "Egrave", "Eacute", "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml",
    "ETH", "Ntilde", "Ograve", "Oacute", "Ocirc", "Otilde", "Ouml", "times", "Oslash",
    "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute", "THORN", "szlig", "agrave", "aacute",
    "acirc", "atilde", "auml", "aring", "aelig", "ccedil", "egrave", "eacute", "ecirc",
    "euml", "igrave", "iacute", "icirc", "iuml", "eth", "ntilde", "ograve", "oacute",
    "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave", "uacute", "ucirc", "uuml",
    "yacute", "thorn", "yuml",
];

/// Names browsers still accept without a trailing semicolon, besides
/// the Latin-1 block
const LEGACY_ASCII: [(&str, char); 10] = [
    ("amp", '&'),
    ("AMP", '&'),
    ("lt", '<'),
    ("LT", '<'),
    ("gt", '>'),
    ("GT", '>'),
    ("quot", '"'),
    ("QUOT", '"'),
    ("COPY", '\u{a9}'),
    ("REG", '\u{ae}'),
];

/// Windows-1252 characters that pages emit as `&#128;` .. `&#159;`
const CP1252_C1: [Option<char>; 32] = [
    Some('\u{20ac}'), None, Some('\u{201a}'), Some('\u{192}'),
    Some('\u{201e}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{2c6}'), Some('\u{2030}'), Some('\u{160}'), Some('\u{2039}'),
    Some('\u{152}'), None, Some('\u{17d}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201c}'),
    Some('\u{201d}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{2dc}'), Some('\u{2122}'), Some('\u{161}'), Some('\u{203a}'),
    Some('\u{153}'), None, Some('\u{17e}'), Some('\u{178}'),
];
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws pattern"));

/// Lazy iterator over the normalized, non-empty lines of a page
pub struct Lines {
    text: String,
    pos: usize,
}

impl Iterator for Lines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pos < self.text.len() {
            let rest = &self.text[self.pos..];
            let (raw, advance) = match rest.find(['\n', '\r']) {
                Some(idx) => (&rest[..idx], idx + 1),
                None => (rest, rest.len()),
            };
            self.pos += advance;

            let compact = WHITESPACE.replace_all(raw, " ");
            let compact = compact.trim();
            if !compact.is_empty() {
                return Some(compact.to_string());
            }
        }
        None
    }
}

/// Convert raw markup into a sequence of trimmed, whitespace-collapsed lines.
pub fn html_to_lines(html: &str) -> Lines {
    let cleaned = SCRIPT_STYLE.replace_all(html, " ");
    let cleaned = LINE_BREAK.replace_all(&cleaned, "\n");
    let cleaned = BLOCK_CLOSE.replace_all(&cleaned, "\n");
    let cleaned = ANY_TAG.replace_all(&cleaned, " ");
    let text = decode_entities(&cleaned);

    Lines { text, pos: 0 }
}

/// Decode named and numeric character references.
///
/// Numeric references and the Latin-1 names (plus `amp`, `lt`, `gt`,
/// `quot`) decode with or without the trailing `;`, the way browsers
/// read legacy pages. Other names need the `;`. Unknown names are kept
/// verbatim.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let terminated = !caps[4].is_empty();
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().map(numeric_reference)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().map(numeric_reference)
            } else {
                decode_named(&caps[3], terminated)
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn numeric_reference(code: u32) -> String {
    let c = match code {
        0 => '\u{fffd}',
        0x80..=0x9f => CP1252_C1[(code - 0x80) as usize].unwrap_or('\u{fffd}'),
        _ => char::from_u32(code).unwrap_or('\u{fffd}'),
    };
    c.to_string()
}

fn decode_named(name: &str, terminated: bool) -> Option<String> {
    if terminated {
        if let Some(c) = named_char(name) {
            return Some(c.to_string());
        }
    }

    // longest legacy name at the start, the rest stays as text
    let semicolon = if terminated { ";" } else { "" };
    (2..=name.len()).rev().find_map(|len| {
        legacy_char(&name[..len]).map(|c| format!("{}{}{}", c, &name[len..], semicolon))
    })
}

fn legacy_char(name: &str) -> Option<char> {
    if let Some(&(_, c)) = LEGACY_ASCII.iter().find(|(n, _)| *n == name) {
        return Some(c);
    }
    LATIN1_NAMES
        .iter()
        .position(|n| *n == name)
        .and_then(|i| char::from_u32(0xa0 + i as u32))
}

fn named_char(name: &str) -> Option<char> {
    if let Some(c) = legacy_char(name) {
        return Some(c);
    }
    let c = match name {
        "apos" => '\'',
        "Copy" | "copysr" => '\u{a9}',
        "OElig" => '\u{152}',
        "oelig" => '\u{153}',
        "Scaron" => '\u{160}',
        "scaron" => '\u{161}',
        "Yuml" => '\u{178}',
        "fnof" => '\u{192}',
        "circ" => '\u{2c6}',
        "tilde" => '\u{2dc}',
        "ensp" => '\u{2002}',
        "emsp" => '\u{2003}',
        "thinsp" => '\u{2009}',
        "zwnj" => '\u{200c}',
        "zwj" => '\u{200d}',
        "lrm" => '\u{200e}',
        "rlm" => '\u{200f}',
        "hyphen" | "dash" => '\u{2010}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "sbquo" => '\u{201a}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "bdquo" => '\u{201e}',
        "dagger" => '\u{2020}',
        "Dagger" => '\u{2021}',
        "bull" => '\u{2022}',
        "hellip" => '\u{2026}',
        "permil" => '\u{2030}',
        "prime" => '\u{2032}',
        "Prime" => '\u{2033}',
        "lsaquo" => '\u{2039}',
        "rsaquo" => '\u{203a}',
        "euro" => '\u{20ac}',
        "trade" | "TRADE" => '\u{2122}',
        "larr" => '\u{2190}',
        "uarr" => '\u{2191}',
        "rarr" => '\u{2192}',
        "darr" => '\u{2193}',
        "harr" => '\u{2194}',
        "minus" => '\u{2212}',
        "infin" => '\u{221e}',
        "ne" => '\u{2260}',
        "le" => '\u{2264}',
        "ge" => '\u{2265}',
        "notin" => '\u{2209}',
        "check" | "checkmark" => '\u{2713}',
        "cross" => '\u{2717}',
        "excl" => '!',
        "num" => '#',
        "dollar" => '$',
        "percnt" => '%',
        "lpar" => '(',
        "rpar" => ')',
        "ast" => '*',
        "plus" => '+',
        "comma" => ',',
        "period" => '.',
        "sol" => '/',
        "colon" => ':',
        "semi" => ';',
        "equals" => '=',
        "quest" => '?',
        "commat" => '@',
        "lowbar" => '_',
        "Tab" => '\t',
        "NewLine" => '\n',
        _ => return None,
    };
    Some(c)
}
