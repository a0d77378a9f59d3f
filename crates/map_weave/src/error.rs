//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover the generation error taxonomy: missing required components,
//! invalid step configuration, duplicate component registration, and exhausted
//! stage sequences.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A step declared a required component that is not present in the context.
    /// Raised before the step body runs; the context is left untouched.
    #[error("step '{step}' requires missing component {type_name} (tag: {tag:?})")]
    MissingComponent {
        step: String,
        type_name: &'static str,
        tag: Option<String>,
    },

    /// A tunable step parameter violates its documented constraint.
    #[error("step '{step}': invalid configuration for '{parameter}': {reason}")]
    InvalidConfiguration {
        step: String,
        parameter: &'static str,
        reason: String,
    },

    /// An identical (type, tag) pair is already registered in the component store.
    /// Signals a composition bug: two steps unconditionally creating the same
    /// tagged component.
    #[error("component {type_name} (tag: {tag:?}) is already present")]
    DuplicateComponent {
        type_name: &'static str,
        tag: Option<String>,
    },

    /// A finished step or generator was asked to advance again.
    #[error("generation stages already exhausted")]
    StagesExhausted,

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
