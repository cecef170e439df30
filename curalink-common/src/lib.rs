//! Common types and utilities shared across CuraLink crates.
//!
//! This crate defines the shared error type, the account model, and the
//! observability helpers used throughout the CuraLink workspace. It stays
//! small so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`CuralinkError`] and [`Result`]: Shared error handling
//! - [`AccountType`]: Which kind of user owns the local profile
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! Parsing the stored account marker:
//!
//! ```rust
//! use curalink_common::AccountType;
//!
//! let kind: AccountType = "patient".parse().unwrap();
//! assert_eq!(kind, AccountType::Patient);
//! assert_eq!(kind.to_string(), "patient");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// The kind of user that completed onboarding on this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Patient,
    Researcher,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Patient => "patient",
            AccountType::Researcher => "researcher",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = CuralinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(AccountType::Patient),
            "researcher" => Ok(AccountType::Researcher),
            other => Err(CuralinkError::InvalidInput(format!(
                "unknown account type: {other}"
            ))),
        }
    }
}

/// Error types used across the CuraLink system.
#[derive(thiserror::Error, Debug)]
pub enum CuralinkError {
    /// The backing key-value store failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored or received value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A form was submitted with required fields left blank.
    #[error("Missing information: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A caller passed a value outside the accepted set.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A referenced entity could not be located.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenient alias for results that use [`CuralinkError`].
pub type Result<T> = std::result::Result<T, CuralinkError>;

/// Collect the names of required fields whose values are blank.
///
/// ```rust
/// use curalink_common::missing_fields;
///
/// let missing = missing_fields(&[("name", "Ada"), ("disease", "  ")]);
/// assert_eq!(missing, vec!["disease".to_string()]);
/// ```
pub fn missing_fields(fields: &[(&str, &str)]) -> Vec<String> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| (*name).to_string())
        .collect()
}

/// Fail with [`CuralinkError::Validation`] when any required field is blank.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<()> {
    let missing = missing_fields(fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CuralinkError::Validation(missing))
    }
}
