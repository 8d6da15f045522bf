//! Outbound cookie jar and `Set-Cookie` decoding.
//!
//! Outbound cookies become a single `Cookie` request header of `name=value;`
//! pairs. Inbound `Set-Cookie` values are reduced to their leading
//! `name=value` assignment; attributes such as `Path` or `Expires` are
//! dropped.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered name/value cookies sent with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar {
    cookies: IndexMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cookie. Re-setting a name keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Serialize as a `Cookie` header value: `a=1;b=x y;`.
    ///
    /// Every pair is followed by `;`, including the last one. Values are
    /// written verbatim.
    pub fn header_value(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.cookies {
            out.push_str(name);
            out.push('=');
            out.push_str(value);
            out.push(';');
        }
        out
    }
}

impl From<IndexMap<String, String>> for CookieJar {
    fn from(cookies: IndexMap<String, String>) -> Self {
        Self { cookies }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieJar {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cookies: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Decode the cookie assignment at the front of a `Set-Cookie` value.
///
/// Only the text before the first `;` is considered. The name is trimmed and
/// the value is percent-decoded; `&` and `+` are kept literally. A missing
/// `=` gives an empty value. Returns `None` when the name is empty.
pub fn parse_set_cookie(value: &str) -> Option<(String, String)> {
    let pair = value.split(';').next().unwrap_or("");
    let (name, raw_value) = match pair.split_once('=') {
        Some((name, raw_value)) => (name.trim(), raw_value.trim()),
        None => (pair.trim(), ""),
    };
    if name.is_empty() {
        return None;
    }
    Some((percent_decode(name), percent_decode(raw_value)))
}

/// Decode `%XX` escapes. Invalid escapes are left as-is; invalid UTF-8 is
/// replaced lossily.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jar_serializes_in_insertion_order() {
        let jar: CookieJar = [("a", "1"), ("b", "x y")].into_iter().collect();
        assert_eq!(jar.header_value(), "a=1;b=x y;");
    }

    #[test]
    fn reinserting_keeps_position() {
        let mut jar = CookieJar::new();
        jar.insert("B1SESSION", "old");
        jar.insert("ROUTEID", ".node1");
        jar.insert("B1SESSION", "new");
        assert_eq!(jar.header_value(), "B1SESSION=new;ROUTEID=.node1;");
    }

    #[test]
    fn empty_jar_serializes_to_empty_string() {
        assert_eq!(CookieJar::new().header_value(), "");
    }

    #[test]
    fn set_cookie_drops_attributes() {
        assert_eq!(
            parse_set_cookie("sid=abc123; Path=/; HttpOnly"),
            Some(("sid".to_string(), "abc123".to_string()))
        );
    }

    #[test]
    fn set_cookie_trims_leading_whitespace() {
        assert_eq!(
            parse_set_cookie("  ROUTEID=.node2; path=/b1s"),
            Some(("ROUTEID".to_string(), ".node2".to_string()))
        );
    }

    #[test]
    fn set_cookie_keeps_ampersand_and_plus() {
        assert_eq!(
            parse_set_cookie("token=a&b+c%20d; Secure"),
            Some(("token".to_string(), "a&b+c d".to_string()))
        );
    }

    #[test]
    fn set_cookie_splits_on_first_equals_only() {
        assert_eq!(
            parse_set_cookie("data=k=v"),
            Some(("data".to_string(), "k=v".to_string()))
        );
    }

    #[test]
    fn set_cookie_without_equals_has_empty_value() {
        assert_eq!(parse_set_cookie("flag; Path=/"), Some(("flag".to_string(), String::new())));
    }

    #[test]
    fn set_cookie_without_name_is_ignored() {
        assert_eq!(parse_set_cookie("=value"), None);
        assert_eq!(parse_set_cookie(""), None);
    }

    #[test]
    fn percent_decode_leaves_bad_escapes() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz%4"), "%zz%4");
        assert_eq!(percent_decode("%41%62"), "Ab");
    }
}
