use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    Bitcode(bitcode::Error),
    Bincode(bincode::Error),
    Json(serde_json::Error),
    /// A type identifier was given that the registry doesn't know.
    Configuration { name: String },
    /// A value was rejected by the collections element type.
    InvalidElement { expected: String, actual: String },
    /// A keyless insertion found no free index above the highest one in use.
    IndexExhausted,
}

impl Error {
    #[inline]
    pub(crate) fn configuration(name: impl Into<String>) -> Self {
        Self::Configuration { name: name.into() }
    }

    #[inline]
    pub(crate) fn invalid_element(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidElement {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bitcode(..), Self::Bitcode(..)) => true,
            (Self::Bincode(..), Self::Bincode(..)) => true,
            (Self::Json(..), Self::Json(..)) => true,
            (Self::Configuration { name: a }, Self::Configuration { name: b }) => a == b,
            (
                Self::InvalidElement {
                    expected: e1,
                    actual: a1,
                },
                Self::InvalidElement {
                    expected: e2,
                    actual: a2,
                },
            ) => e1 == e2 && a1 == a2,
            (Self::IndexExhausted, Self::IndexExhausted) => true,
            (_, _) => false,
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(value: bincode::Error) -> Self {
        Self::Bincode(value)
    }
}

impl From<bitcode::Error> for Error {
    fn from(value: bitcode::Error) -> Self {
        Self::Bitcode(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration { name } => {
                write!(f, "Type {name} could not be found. Please register it first")
            }
            Self::InvalidElement { expected, actual } => write!(
                f,
                "Collection accepts only objects ({expected}) but ({actual}) was passed"
            ),
            Self::IndexExhausted => {
                f.write_str("Cannot add element, the next index is already occupied")
            }
            _ => write!(f, "{self:?}"),
        }
    }
}

impl std::error::Error for Error {}
