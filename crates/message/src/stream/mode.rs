//! fopen-style access modes (`r`, `w+`, `ab`, `c+t`, ...).

use std::fs::OpenOptions;

use crate::error::MessageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    Read,
    Write,
    Append,
    Exclusive,
    Create,
    /// `rw`: write-only on an existing resource.
    Legacy,
}

/// A parsed access mode.
///
/// The grammar is one of `r w a x c`, an optional `+`, and an optional
/// trailing `b` or `t` (which carry no meaning here). Readability and
/// writability follow the usual rules: `r` reads, everything else writes,
/// and `+` grants the missing half. The legacy `rw` spelling is accepted
/// as writable only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    base: Base,
    plus: bool,
}

impl OpenMode {
    pub const READ: OpenMode = OpenMode { base: Base::Read, plus: false };
    pub const READ_WRITE: OpenMode = OpenMode { base: Base::Read, plus: true };
    pub const WRITE: OpenMode = OpenMode { base: Base::Write, plus: false };

    pub fn parse(mode: &str) -> Result<Self, MessageError> {
        let invalid = || MessageError::invalid_argument(format!("unsupported stream mode {mode:?}"));

        let trimmed = mode.strip_suffix(['b', 't']).unwrap_or(mode);
        if trimmed == "rw" {
            return Ok(Self { base: Base::Legacy, plus: false });
        }
        let mut chars = trimmed.chars();

        let base = match chars.next() {
            Some('r') => Base::Read,
            Some('w') => Base::Write,
            Some('a') => Base::Append,
            Some('x') => Base::Exclusive,
            Some('c') => Base::Create,
            _ => return Err(invalid()),
        };

        let plus = match chars.next() {
            None => false,
            Some('+') => true,
            Some(_) => return Err(invalid()),
        };

        if chars.next().is_some() {
            return Err(invalid());
        }

        Ok(Self { base, plus })
    }

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.base == Base::Read || self.plus
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.base != Base::Read || self.plus
    }

    /// Translates the mode into the equivalent [`OpenOptions`].
    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.is_readable());
        match self.base {
            Base::Read => {
                options.write(self.plus);
            }
            Base::Write => {
                options.write(true).create(true).truncate(true);
            }
            Base::Append => {
                options.append(true).create(true);
            }
            Base::Exclusive => {
                options.write(true).create_new(true);
            }
            Base::Create => {
                options.write(true).create(true);
            }
            Base::Legacy => {
                options.write(true);
            }
        }
        options
    }
}

impl std::str::FromStr for OpenMode {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_flags() {
        let cases = [
            ("r", true, false),
            ("rb", true, false),
            ("r+", true, true),
            ("r+b", true, true),
            ("w", false, true),
            ("w+t", true, true),
            ("a", false, true),
            ("a+", true, true),
            ("x", false, true),
            ("x+", true, true),
            ("c", false, true),
            ("c+b", true, true),
            ("rw", false, true),
            ("rwb", false, true),
        ];

        for (mode, readable, writable) in cases {
            let parsed = OpenMode::parse(mode).unwrap();
            assert_eq!(parsed.is_readable(), readable, "mode {mode}");
            assert_eq!(parsed.is_writable(), writable, "mode {mode}");
        }
    }

    #[test]
    fn rejects_unknown_modes() {
        for mode in ["", "z", "r++", "rw+x", "+", "b"] {
            let err = OpenMode::parse(mode).unwrap_err();
            assert!(err.is_invalid_argument(), "mode {mode:?}");
        }
    }

    #[test]
    fn legacy_read_write_opens_existing_for_writing() {
        let mode = OpenMode::parse("rw").unwrap();
        assert_ne!(mode, OpenMode::WRITE);

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(mode.open_options().open(&missing).is_err());

        let existing = dir.path().join("existing.txt");
        std::fs::write(&existing, "keep").unwrap();
        assert!(mode.open_options().open(&existing).is_ok());
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "keep");
    }
}
