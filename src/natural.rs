//! Natural-order string comparison
//!
//! Digit runs compare as numeric magnitudes, so "file2" sorts before
//! "file10". Non-digit runs compare ASCII case-insensitively. The key alone
//! does not total-order distinct strings ("A"/"a", "01"/"1" share a key), so
//! [`natural_cmp`] breaks ties with a literal comparison.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

/// One run of a name: either digits (leading zeros stripped) or text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Text(&'a str),
}

impl Token<'_> {
    fn key_cmp(self, other: Self) -> Ordering {
        match (self, other) {
            // Stripped of leading zeros, a longer digit run is a larger
            // magnitude; equal lengths compare digit by digit.
            (Token::Number(a), Token::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Token::Number(_), Token::Text(_)) => Ordering::Less,
            (Token::Text(_), Token::Number(_)) => Ordering::Greater,
            (Token::Text(a), Token::Text(b)) => a
                .bytes()
                .map(|c| c.to_ascii_lowercase())
                .cmp(b.bytes().map(|c| c.to_ascii_lowercase())),
        }
    }
}

struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.rest.as_bytes();
        let first = *bytes.first()?;
        if first.is_ascii_digit() {
            let end = bytes
                .iter()
                .position(|b| !b.is_ascii_digit())
                .unwrap_or(bytes.len());
            let (run, rest) = self.rest.split_at(end);
            self.rest = rest;
            Some(Token::Number(run.trim_start_matches('0')))
        } else {
            let end = bytes
                .iter()
                .position(|b| b.is_ascii_digit())
                .unwrap_or(bytes.len());
            let (run, rest) = self.rest.split_at(end);
            self.rest = rest;
            Some(Token::Text(run))
        }
    }
}

fn tokens(s: &str) -> Tokens<'_> {
    Tokens { rest: s }
}

/// Compare two names by natural key only. Not a total order over distinct
/// strings; see [`natural_cmp`].
pub fn natural_key_cmp(a: &str, b: &str) -> Ordering {
    let mut ta = tokens(a);
    let mut tb = tokens(b);
    loop {
        match (ta.next(), tb.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match x.key_cmp(y) {
                Ordering::Equal => continue,
                ord => return ord,
            },
        }
    }
}

/// Total natural order: natural key first, literal comparison as tiebreak.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key_cmp(a, b).then_with(|| a.cmp(b))
}

/// Total natural order over raw filenames. The key is computed over the
/// lossy UTF-8 view (digit runs are ASCII either way); the tiebreak compares
/// the real bytes, so names that are not valid UTF-8 still order totally and
/// deterministically.
pub fn natural_os_cmp(a: &OsStr, b: &OsStr) -> Ordering {
    natural_key_cmp(&a.to_string_lossy(), &b.to_string_lossy())
        .then_with(|| a.as_bytes().cmp(b.as_bytes()))
}
