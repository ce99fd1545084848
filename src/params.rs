//! Request parameter sources
//!
//! A [`ParamSource`] answers one question: "what is the raw string value for
//! this key?". Absent and empty are not distinguished; both are `""`.

use std::collections::{BTreeMap, HashMap};

/// Read-only access to raw request parameters
pub trait ParamSource {
    /// Raw value for `key`, or an empty string when absent
    fn param(&self, key: &str) -> String;
}

impl<T: ParamSource + ?Sized> ParamSource for &T {
    fn param(&self, key: &str) -> String {
        (**self).param(key)
    }
}

impl ParamSource for HashMap<String, String> {
    fn param(&self, key: &str) -> String {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl ParamSource for BTreeMap<String, String> {
    fn param(&self, key: &str) -> String {
        self.get(key).cloned().unwrap_or_default()
    }
}

/// First matching pair wins
impl<K: AsRef<str>, V: AsRef<str>> ParamSource for [(K, V)] {
    fn param(&self, key: &str) -> String {
        self.iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref().to_string())
            .unwrap_or_default()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> ParamSource for Vec<(K, V)> {
    fn param(&self, key: &str) -> String {
        self.as_slice().param(key)
    }
}

/// Adapts a lookup closure, e.g. one reading from a framework's request type
pub struct FnParams<F>(pub F);

impl<F> ParamSource for FnParams<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn param(&self, key: &str) -> String {
        (self.0)(key).unwrap_or_default()
    }
}

/// Parameters decoded from a raw `application/x-www-form-urlencoded` query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    /// Parse `a=1&b=x%20y`; a leading `?` is ignored and malformed escapes are kept literally
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = raw
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (decode(k), decode(v)),
                None => (decode(part), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// Decoded pairs in the order they appear
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl ParamSource for QueryString {
    fn param(&self, key: &str) -> String {
        self.pairs.param(key)
    }
}

fn decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
