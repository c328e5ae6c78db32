//! Newtype wrapper for slide identifiers.
//!
//! Slide ids travel from the request body through every stage into log lines,
//! fallback placeholders and artifacts, so they get their own type instead of
//! a bare `String`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The stable identifier of a slide, as assigned by the editor.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(Arc<str>);

impl SlideId {
    /// Creates a new SlideId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this slide id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SlideId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for SlideId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for SlideId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
