use crate::utils::canonical_index;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Key of an entry in a collection. Either an integer index or a name.
///
/// Text that is a canonical decimal number becomes an index, so `"3"` and `3` address the same
/// entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Index(u64),
    Name(String),
}

impl Key {
    #[inline]
    pub fn as_index(&self) -> Option<u64> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }

    #[inline]
    pub fn is_index(&self) -> bool {
        matches!(self, Key::Index(_))
    }
}

impl From<u64> for Key {
    #[inline]
    fn from(value: u64) -> Self {
        Key::Index(value)
    }
}

impl From<u32> for Key {
    #[inline]
    fn from(value: u32) -> Self {
        Key::Index(value as u64)
    }
}

impl From<usize> for Key {
    #[inline]
    fn from(value: usize) -> Self {
        Key::Index(value as u64)
    }
}

impl From<i32> for Key {
    /// Negative numbers can't be indices and are kept as names.
    fn from(value: i32) -> Self {
        match u64::try_from(value) {
            Ok(i) => Key::Index(i),
            Err(_) => Key::Name(value.to_string()),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        match canonical_index(value) {
            Some(i) => Key::Index(i),
            None => Key::Name(value.to_string()),
        }
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        match canonical_index(&value) {
            Some(i) => Key::Index(i),
            None => Key::Name(value),
        }
    }
}

impl From<&Key> for Key {
    #[inline]
    fn from(value: &Key) -> Self {
        value.clone()
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(n) => f.write_str(n),
        }
    }
}
