use std::collections::HashMap;

use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;

use crate::ensure;
use crate::error::MessageError;

/// Returns true if `name` matches the token grammar
/// `[!#$%&'*+.^_`|~0-9A-Za-z-]+`.
pub fn is_token(name: &str) -> bool {
    !name.is_empty() && HeaderName::from_bytes(name.as_bytes()).is_ok()
}

/// Returns true if `value` only holds visible ASCII, space, tab and obs-text
/// (0x80-0xFF).
pub fn is_field_value(value: &str) -> bool {
    HeaderValue::from_str(value).is_ok()
}

fn trim_whitespace(value: &str) -> &str {
    value.trim_matches([' ', '\t'])
}

fn validate<I, V>(name: &str, values: I) -> Result<Vec<String>, MessageError>
where
    I: IntoIterator<Item = V>,
    V: AsRef<str>,
{
    ensure!(is_token(name), MessageError::invalid_argument(format!("header name {name:?} is not an RFC 7230 token")));

    let mut trimmed = Vec::new();
    for value in values {
        let value = value.as_ref();
        ensure!(
            is_field_value(value),
            MessageError::invalid_argument(format!("value of header {name} is not an RFC 7230 field value"))
        );
        trimmed.push(trim_whitespace(value).to_string());
    }

    ensure!(!trimmed.is_empty(), MessageError::invalid_argument(format!("header {name} needs at least one value")));
    Ok(trimmed)
}

/// Ordered multi-value header store.
///
/// Entries are kept in insertion order under their canonical casing; a
/// parallel map from the lower-cased name to that casing serves lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    headers: IndexMap<String, Vec<String>>,
    names: HashMap<String, String>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `values` to header `name`, appending to any values already
    /// stored under another casing of the same name.
    pub fn set_all<I, V>(&mut self, name: &str, values: I) -> Result<(), MessageError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let values = validate(name, values)?;
        let lowercase = name.to_ascii_lowercase();

        if let Some(canonical) = self.names.get(&lowercase) {
            if let Some(existing) = self.headers.get_mut(canonical) {
                existing.extend(values);
                return Ok(());
            }
        }

        self.names.insert(lowercase, name.to_string());
        self.headers.insert(name.to_string(), values);
        Ok(())
    }

    /// Single-value form of [`set_all`](Self::set_all).
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), MessageError> {
        self.set_all(name, [value])
    }

    /// Replaces every value of header `name`. The header keeps its position
    /// but takes the casing given here.
    pub fn replace<I, V>(&mut self, name: &str, values: I) -> Result<(), MessageError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let values = validate(name, values)?;
        let lowercase = name.to_ascii_lowercase();

        let index = self
            .names
            .get(&lowercase)
            .and_then(|canonical| self.headers.shift_remove_full(canonical))
            .map(|(index, _, _)| index);

        match index {
            Some(index) => {
                self.headers.shift_insert(index, name.to_string(), values);
            }
            None => {
                self.headers.insert(name.to_string(), values);
            }
        }
        self.names.insert(lowercase, name.to_string());
        Ok(())
    }

    /// Single-value form of [`replace`](Self::replace).
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), MessageError> {
        self.replace(name, [value])
    }

    /// Replaces header `name` and moves it to the first position.
    ///
    /// An existing casing of the name is kept.
    pub fn set_front<I, V>(&mut self, name: &str, values: I) -> Result<(), MessageError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let values = validate(name, values)?;
        let lowercase = name.to_ascii_lowercase();

        let canonical = match self.names.get(&lowercase) {
            Some(canonical) => canonical.clone(),
            None => {
                self.names.insert(lowercase, name.to_string());
                name.to_string()
            }
        };

        self.headers.shift_remove(&canonical);
        self.headers.shift_insert(0, canonical, values);
        Ok(())
    }

    /// All values of header `name`, or an empty slice.
    pub fn get(&self, name: &str) -> &[String] {
        self.names
            .get(&name.to_ascii_lowercase())
            .and_then(|canonical| self.headers.get(canonical))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All values of header `name` joined with `", "`.
    pub fn get_line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    pub fn has(&self, name: &str) -> bool {
        self.names.contains_key(&name.to_ascii_lowercase())
    }

    /// Removes header `name` under whatever casing it was stored. No-op if absent.
    pub fn remove(&mut self, name: &str) {
        if let Some(canonical) = self.names.remove(&name.to_ascii_lowercase()) {
            self.headers.shift_remove(&canonical);
        }
    }

    /// The canonical casing header `name` is stored under.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.names.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.headers.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.headers.keys().map(String::as_str)
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Converts the bag into an [`http::HeaderMap`]. Casing is lost there.
    pub fn to_header_map(&self) -> Result<HeaderMap, MessageError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, values) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(MessageError::invalid_argument)?;
            for value in values {
                let header_value = HeaderValue::from_str(value).map_err(MessageError::invalid_argument)?;
                map.append(header_name.clone(), header_value);
            }
        }
        Ok(map)
    }
}

impl<'a> IntoIterator for &'a HeaderBag {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut bag = HeaderBag::new();
        bag.set_all("Content-Type", ["text/html"]).unwrap();

        for name in ["content-type", "CONTENT-TYPE", "Content-Type", "cOnTeNt-TyPe"] {
            assert!(bag.has(name));
            assert_eq!(bag.get(name), ["text/html"]);
        }
        assert!(!bag.has("content-length"));
        assert!(bag.get("content-length").is_empty());
    }

    #[test]
    fn first_casing_wins_and_values_merge() {
        let mut bag = HeaderBag::new();
        bag.set_all("X-Trace", ["a"]).unwrap();
        bag.set_all("x-trace", ["b", "c"]).unwrap();

        assert_eq!(bag.names().collect::<Vec<_>>(), ["X-Trace"]);
        assert_eq!(bag.get("X-TRACE"), ["a", "b", "c"]);
        assert_eq!(bag.get_line("x-trace"), "a, b, c");
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn values_are_trimmed() {
        let mut bag = HeaderBag::new();
        bag.set_all("Accept", [" \ttext/plain \t", "  */*"]).unwrap();
        assert_eq!(bag.get("accept"), ["text/plain", "*/*"]);
    }

    #[test]
    fn replace_takes_new_casing_and_keeps_position() {
        let mut bag = HeaderBag::new();
        bag.insert("Host", "a").unwrap();
        bag.insert("x-one", "1").unwrap();
        bag.insert("Accept", "*/*").unwrap();

        bag.replace("X-ONE", ["2", "3"]).unwrap();

        assert_eq!(bag.names().collect::<Vec<_>>(), ["Host", "X-ONE", "Accept"]);
        assert_eq!(bag.get("x-one"), ["2", "3"]);
        assert_eq!(bag.canonical_name("x-one"), Some("X-ONE"));
    }

    #[test]
    fn set_front_moves_header_first() {
        let mut bag = HeaderBag::new();
        bag.insert("Accept", "*/*").unwrap();
        bag.insert("host", "old").unwrap();

        bag.set_front("Host", ["new"]).unwrap();

        assert_eq!(bag.names().collect::<Vec<_>>(), ["host", "Accept"]);
        assert_eq!(bag.get("HOST"), ["new"]);
    }

    #[test]
    fn remove_deletes_both_maps() {
        let mut bag = HeaderBag::new();
        bag.insert("Set-Cookie", "a=1").unwrap();
        bag.remove("set-cookie");
        bag.remove("missing");

        assert!(!bag.has("Set-Cookie"));
        assert!(bag.is_empty());
        assert_eq!(bag.canonical_name("set-cookie"), None);

        bag.insert("SET-COOKIE", "b=2").unwrap();
        assert_eq!(bag.names().collect::<Vec<_>>(), ["SET-COOKIE"]);
    }

    #[test]
    fn rejects_invalid_names() {
        let mut bag = HeaderBag::new();
        for name in ["", "Bad Name", "bad:name", "bad\r\n", "(comment)", "naïve"] {
            let err = bag.insert(name, "v").unwrap_err();
            assert!(err.is_invalid_argument(), "name {name:?}");
        }
        assert!(bag.is_empty());
    }

    #[test]
    fn accepts_every_token_char() {
        let mut bag = HeaderBag::new();
        bag.insert("!#$%&'*+.^_`|~09azAZ-", "v").unwrap();
        assert!(bag.has("!#$%&'*+.^_`|~09AZaz-"));
    }

    #[test]
    fn rejects_invalid_values() {
        let mut bag = HeaderBag::new();
        for value in ["a\r\nInjected: 1", "nul\0", "bell\x07", "del\x7f"] {
            let err = bag.insert("X-Test", value).unwrap_err();
            assert!(err.is_invalid_argument(), "value {value:?}");
        }

        let err = bag.set_all("X-Test", Vec::<String>::new()).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(!bag.has("X-Test"));
    }

    #[test]
    fn failed_validation_leaves_bag_untouched() {
        let mut bag = HeaderBag::new();
        bag.insert("X-Test", "ok").unwrap();
        assert!(bag.set_all("X-Test", ["fine", "bad\n"]).is_err());
        assert_eq!(bag.get("x-test"), ["ok"]);
    }

    #[test]
    fn accepts_obs_text_and_tabs() {
        let mut bag = HeaderBag::new();
        bag.insert("X-Name", "caf\u{e9}\tbar").unwrap();
        assert_eq!(bag.get("x-name"), ["caf\u{e9}\tbar"]);
    }

    #[test]
    fn converts_to_header_map() {
        let mut bag = HeaderBag::new();
        bag.set_all("Accept", ["a", "b"]).unwrap();
        bag.insert("Host", "example.com").unwrap();

        let map = bag.to_header_map().unwrap();
        assert_eq!(map.get_all(http::header::ACCEPT).iter().count(), 2);
        assert_eq!(map.get(http::header::HOST).unwrap(), "example.com");
    }
}
