//! Reference to a user's stream.

use std::fmt;

/// Sentinel id that refers to the authenticated user's own stream.
pub const SELF_SENTINEL: &str = "me";

/// Which stream to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamRef {
    /// The authenticated user's own stream.
    Me,
    /// A stream by id.
    Id(String),
}

impl StreamRef {
    /// Resolves to a concrete id, using `own_id` for [`StreamRef::Me`].
    #[must_use]
    pub fn resolve<'a>(&'a self, own_id: Option<&'a str>) -> Option<&'a str> {
        match self {
            Self::Me => own_id,
            Self::Id(id) => Some(id.as_str()),
        }
    }
}

impl From<&str> for StreamRef {
    fn from(id: &str) -> Self {
        if id == SELF_SENTINEL {
            Self::Me
        } else {
            Self::Id(id.to_string())
        }
    }
}

impl From<String> for StreamRef {
    fn from(id: String) -> Self {
        if id == SELF_SENTINEL { Self::Me } else { Self::Id(id) }
    }
}

impl fmt::Display for StreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Me => f.write_str(SELF_SENTINEL),
            Self::Id(id) => f.write_str(id),
        }
    }
}
