//! Lease identifier encoding and generation.
//!
//! A lease id is `<type>-<suffix>`. Decoding splits on the first separator
//! only, so suffixes (UUIDs included) may contain further hyphens. An id with
//! no separator decodes to an empty type and the whole input as suffix; the
//! lease manager treats that as an unresolvable lease rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::SecretType;

/// Separator between the type and suffix of a lease id.
pub const SEPARATOR: char = '-';

/// Encodes a lease id from a secret type and unique suffix.
#[must_use]
pub fn encode(secret_type: &SecretType, suffix: &str) -> LeaseId {
    LeaseId(format!("{secret_type}{SEPARATOR}{suffix}"))
}

/// Splits a lease id into its type and suffix.
///
/// Returns `("", id)` when no separator is present.
#[must_use]
pub fn secret_type(id: &str) -> (&str, &str) {
    id.split_once(SEPARATOR).unwrap_or(("", id))
}

/// An encoded lease identifier.
///
/// Wraps the raw string so persisted ids survive unchanged, whatever their
/// shape; decoding is done on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseId(String);

impl LeaseId {
    /// Wraps an existing lease id string. Never fails.
    #[must_use]
    pub fn parse(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the full identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the decoded type component; empty if unresolvable.
    #[must_use]
    pub fn secret_type(&self) -> &str {
        secret_type(&self.0).0
    }

    /// Returns the decoded suffix component.
    #[must_use]
    pub fn suffix(&self) -> &str {
        secret_type(&self.0).1
    }

    /// Returns true if the id carries a type that could name a descriptor.
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        !self.secret_type().is_empty()
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for LeaseId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LeaseId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<LeaseId> for String {
    fn from(id: LeaseId) -> Self {
        id.0
    }
}

impl AsRef<str> for LeaseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of unique lease id suffixes.
///
/// Implementations must be safe for concurrent use and return values that are
/// unique across the process lifetime.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh unique suffix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdGeneration`] if no identifier could be produced.
    fn generate(&self) -> Result<String>;
}

impl<F> IdGenerator for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn generate(&self) -> Result<String> {
        self()
    }
}

/// Generates random UUIDv4 suffixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String> {
        Ok(Uuid::new_v4().to_string())
    }
}

/// Builds an [`Error::IdGeneration`] from any message.
#[must_use]
pub fn generation_error(reason: impl Into<String>) -> Error {
    Error::IdGeneration {
        reason: reason.into(),
    }
}
