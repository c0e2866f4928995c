//! Object type tags

use std::fmt;
use std::str::FromStr;

/// Type tag written at the start of every object header
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw content
    Blob,
    /// Directory listing
    Tree,
    /// Snapshot with metadata
    Commit,
    /// Annotated tag
    Tag,
    /// Any other tag
    Other(TypeTag),
}

/// A type token outside the builtin set: non-empty printable ASCII, no space
///
/// Only constructed through [`ObjectKind::from_bytes`] or `FromStr`, so it
/// never holds a builtin name or a byte that would break the header.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ObjectKind {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
            ObjectKind::Tag => "tag",
            ObjectKind::Other(tag) => tag.as_str(),
        }
    }

    /// Parse a header type token; `None` if it is empty or has bytes
    /// outside printable ASCII (space and NUL included).
    pub fn from_bytes(b: &[u8]) -> Option<Self> {
        match b {
            b"blob" => Some(ObjectKind::Blob),
            b"tree" => Some(ObjectKind::Tree),
            b"commit" => Some(ObjectKind::Commit),
            b"tag" => Some(ObjectKind::Tag),
            _ if !b.is_empty() && b.iter().all(u8::is_ascii_graphic) => std::str::from_utf8(b)
                .ok()
                .map(|s| ObjectKind::Other(TypeTag(s.to_owned()))),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, ObjectKind::Other(_))
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        ObjectKind::from_bytes(s.as_bytes())
            .ok_or_else(|| crate::Error::InvalidArgument(format!("invalid object type: {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_and_parse() {
        for kind in [
            ObjectKind::Blob,
            ObjectKind::Tree,
            ObjectKind::Commit,
            ObjectKind::Tag,
        ] {
            assert_eq!(kind.as_str().parse::<ObjectKind>().unwrap(), kind);
            assert!(kind.is_builtin());
        }
        assert_eq!(format!("{}", ObjectKind::Blob), "blob");
    }

    #[test]
    fn test_other_tag() {
        let note: ObjectKind = "note".parse().unwrap();
        assert!(!note.is_builtin());
        assert_eq!(note.as_str(), "note");
        assert_eq!(format!("{}", note), "note");

        // case matters; only the exact builtin names map to builtin variants
        assert!(matches!("Blob".parse::<ObjectKind>().unwrap(), ObjectKind::Other(_)));
    }

    #[test]
    fn test_invalid_tag() {
        assert!(ObjectKind::from_bytes(b"").is_none());
        assert!(ObjectKind::from_bytes(b"blob ").is_none());
        assert!(ObjectKind::from_bytes(b"no\0te").is_none());
        assert!(ObjectKind::from_bytes("bl\u{f6}b".as_bytes()).is_none());
        assert!("a b".parse::<ObjectKind>().is_err());
    }
}
