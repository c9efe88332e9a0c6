/// A parsed `Content-Range` value, `<unit> <first>-<last>/<length|*>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRange {
    pub unit: String,
    pub first: u64,
    pub last: u64,
    /// `None` for `*`
    pub length: Option<u64>,
}

fn digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl ContentRange {
    pub fn parse(value: &str) -> Option<Self> {
        let (unit, range) = value.trim().split_once(|c: char| c.is_ascii_whitespace())?;
        if unit.is_empty() || !unit.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }

        let (first, rest) = range.trim_start().split_once('-')?;
        let (last, length) = rest.split_once('/')?;
        let length = match length.trim_end() {
            "*" => None,
            length => Some(digits(length)?),
        };

        Some(Self { unit: unit.to_owned(), first: digits(first)?, last: digits(last)?, length })
    }

    pub fn is_bytes(&self) -> bool {
        self.unit == "bytes"
    }

    /// Number of bytes covered by the inclusive range.
    pub fn len(&self) -> u64 {
        self.last.saturating_add(1).saturating_sub(self.first)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bytes_range() {
        let range = ContentRange::parse("bytes 0-499/1234").unwrap();
        assert_eq!(range, ContentRange { unit: "bytes".into(), first: 0, last: 499, length: Some(1234) });
        assert!(range.is_bytes());
        assert_eq!(range.len(), 500);
    }

    #[test]
    fn parse_unknown_length() {
        let range = ContentRange::parse(" bytes   10-19/* ").unwrap();
        assert_eq!(range.length, None);
        assert_eq!(range.len(), 10);
    }

    #[test]
    fn other_units_parse_but_are_not_bytes() {
        let range = ContentRange::parse("items 1-2/3").unwrap();
        assert!(!range.is_bytes());
    }

    #[test]
    fn reject_malformed() {
        for value in ["", "bytes", "bytes 0-/10", "bytes -5/10", "bytes 1-2", "bytes a-b/c", "by-tes 1-2/3", "bytes */100"] {
            assert_eq!(ContentRange::parse(value), None, "value {value:?}");
        }
    }

    #[test]
    fn inverted_range_is_empty() {
        let range = ContentRange::parse("bytes 9-3/10").unwrap();
        assert!(range.is_empty());
    }
}
