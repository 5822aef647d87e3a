//! Inbound request payload — named values and an optional file part.
//!
//! DESIGN
//! ======
//! The transport layer turns an HTTP request into a `SyncPayload`: form
//! values keyed by name (each name may carry zero or more values) plus at
//! most one streamed file part. The sync handler never sees HTTP types.
//!
//! Presence matters more than content here. An empty string is a real value
//! that must overwrite state, while a missing name means "not part of this
//! submission". `FormValues::extract` encodes that precedence once so every
//! widget applies it the same way.

use std::collections::HashMap;
use std::fmt;
use std::io;

use axum::body::Bytes;
use futures::stream::{self, BoxStream, StreamExt};

// =============================================================================
// FORM VALUES
// =============================================================================

/// Named form values with "present vs. absent" preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    fields: HashMap<String, Vec<String>>,
}

/// Result of looking up one named value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extracted<'a> {
    /// A value was supplied, possibly the empty string.
    Value(&'a str),
    /// The name was listed with zero values: an explicit empty value.
    ExplicitEmpty,
    /// The name was not part of the submission.
    Absent,
}

impl Extracted<'_> {
    /// The new value to store, or `None` when state must stay unchanged.
    #[must_use]
    pub fn into_update(self) -> Option<String> {
        match self {
            Self::Value(v) => Some(v.to_string()),
            Self::ExplicitEmpty => Some(String::new()),
            Self::Absent => None,
        }
    }
}

impl FormValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `name=value` pairs, keeping repeated names.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = Self::new();
        for (k, v) in pairs {
            values.push(k, v);
        }
        values
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    /// List a name with no values.
    pub fn list_empty(&mut self, name: impl Into<String>) {
        self.fields.entry(name.into()).or_default();
    }

    /// First value for `name`, if any.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|vs| vs.first())
            .map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Value-then-presence lookup:
    /// 1. a supplied value (even `""`) wins,
    /// 2. a name listed with zero values is an explicit empty value,
    /// 3. otherwise the field is absent.
    #[must_use]
    pub fn extract(&self, name: &str) -> Extracted<'_> {
        if let Some(value) = self.first(name) {
            return Extracted::Value(value);
        }
        if self.contains(name) {
            return Extracted::ExplicitEmpty;
        }
        Extracted::Absent
    }
}

// =============================================================================
// FILE PART
// =============================================================================

/// One streamed multipart file with its client-declared (untrusted) name.
pub struct FilePart<'a> {
    pub original_name: String,
    pub chunks: BoxStream<'a, io::Result<Bytes>>,
}

impl<'a> FilePart<'a> {
    pub fn new(original_name: impl Into<String>, chunks: BoxStream<'a, io::Result<Bytes>>) -> Self {
        Self { original_name: original_name.into(), chunks }
    }
}

impl FilePart<'static> {
    /// In-memory file part, used by tests and server-side callers.
    pub fn from_bytes(original_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::new(original_name, stream::once(async move { Ok(bytes) }).boxed())
    }
}

impl fmt::Debug for FilePart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("original_name", &self.original_name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// SYNC PAYLOAD
// =============================================================================

/// Everything a notification brings besides its routing fields.
#[derive(Debug, Default)]
pub struct SyncPayload<'a> {
    pub values: FormValues,
    pub file: Option<FilePart<'a>>,
}

impl<'a> SyncPayload<'a> {
    #[must_use]
    pub fn from_values(values: FormValues) -> Self {
        Self { values, file: None }
    }

    #[must_use]
    pub fn with_file(mut self, file: FilePart<'a>) -> Self {
        self.file = Some(file);
        self
    }
}

#[cfg(test)]
#[path = "payload_test.rs"]
mod tests;
