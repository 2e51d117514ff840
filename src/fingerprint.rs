//! Source fingerprinting.
//!
//! ## Fingerprint Specification
//!
//! ```text
//! fingerprint(source, strip) = SHA256(UTF-8(prepare(trim(source), strip)))
//! prepare(text, true)  = normalize(text), or text if normalization fails
//! prepare(text, false) = text
//! ```
//!
//! Normalization is best-effort: text that cannot be parsed is hashed as
//! trimmed text instead. For functions, a missing source is an error, and so
//! is a source with no code left after preparation (blank, or only comments
//! and docstrings): its digest would be the SHA-256 of the empty string.
//!
//! Function sources are never recovered at runtime; the graph engine supplies
//! each originating function's full text (decorators and signature included)
//! through [`OriginatingFunction`].

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::sha256_hex;
use crate::source::normalize;

/// A 64-character lowercase hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an existing hex digest.
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Digest the exact bytes of `text`, without trimming or normalization.
    pub fn of_text(text: &str) -> Self {
        Self(sha256_hex(text.as_bytes()))
    }

    /// Get the digest as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The source text of a function could not be located.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("source unavailable for function `{function}`: {reason}")]
pub struct SourceUnavailableError {
    /// Qualified name of the function.
    pub function: String,
    /// Why no source exists (e.g. generated at runtime).
    pub reason: String,
}

/// A source-bearing function that defines a graph node.
///
/// Implementations are owned by the graph engine and shared read-only with
/// snapshots.
pub trait OriginatingFunction: fmt::Debug + Send + Sync {
    /// Qualified name, e.g. `"features.spend_per_signup"`.
    fn qualified_name(&self) -> &str;

    /// Full source text of the definition.
    fn source(&self) -> Result<&str, SourceUnavailableError>;
}

/// Stock [`OriginatingFunction`] holding source supplied at graph build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSource {
    qualified_name: String,
    source: Option<String>,
}

impl FunctionSource {
    /// A function with known source text.
    pub fn new(qualified_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            source: Some(source.into()),
        }
    }

    /// A function whose source cannot be located (generated, no backing file).
    pub fn unavailable(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            source: None,
        }
    }
}

impl OriginatingFunction for FunctionSource {
    fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    fn source(&self) -> Result<&str, SourceUnavailableError> {
        self.source.as_deref().ok_or_else(|| SourceUnavailableError {
            function: self.qualified_name.clone(),
            reason: "no source text was supplied for this function".to_string(),
        })
    }
}

/// What to fingerprint: raw text or a function's source.
#[derive(Debug, Clone, Copy)]
pub enum SourceInput<'a> {
    /// Source text.
    Text(&'a str),
    /// A function whose full source is hashed.
    Function(&'a dyn OriginatingFunction),
}

impl<'a> From<&'a str> for SourceInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for SourceInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text.as_str())
    }
}

impl<'a> From<&'a FunctionSource> for SourceInput<'a> {
    fn from(function: &'a FunctionSource) -> Self {
        Self::Function(function)
    }
}

/// Fingerprint source text or a function's source.
///
/// # Errors
/// Returns [`SourceUnavailableError`] when a function has no source text, or
/// its source contains no code.
///
/// # Example
///
/// ```rust
/// use dataflow_snapshot::fingerprint::fingerprint;
///
/// let documented = "def f(x):\n    \"\"\"Docs.\"\"\"\n    return x  # note";
/// let bare = "def f(x):\n    return x";
/// assert_eq!(fingerprint(documented, true).unwrap(), fingerprint(bare, true).unwrap());
/// assert_ne!(fingerprint(documented, false).unwrap(), fingerprint(bare, false).unwrap());
/// ```
pub fn fingerprint<'a>(
    source: impl Into<SourceInput<'a>>,
    strip: bool,
) -> Result<Fingerprint, SourceUnavailableError> {
    match source.into() {
        SourceInput::Text(text) => Ok(hash_text(text, strip)),
        SourceInput::Function(function) => {
            let prepared = prepare(function.source()?, strip);
            if prepared.is_empty() {
                return Err(SourceUnavailableError {
                    function: function.qualified_name().to_string(),
                    reason: "source contains no code".to_string(),
                });
            }
            Ok(Fingerprint::of_text(&prepared))
        }
    }
}

/// Fingerprint source text. Infallible form of [`fingerprint`].
pub fn hash_text(text: &str, strip: bool) -> Fingerprint {
    Fingerprint::of_text(&prepare(text, strip))
}

fn prepare(text: &str, strip: bool) -> Cow<'_, str> {
    let trimmed = text.trim();
    if strip {
        match normalize(trimmed) {
            Ok(normalized) => return Cow::Owned(normalized),
            Err(error) => {
                tracing::debug!(%error, "source normalization failed, hashing trimmed text");
            }
        }
    }
    Cow::Borrowed(trimmed)
}
