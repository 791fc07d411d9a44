//! Registry error taxonomy
//!
//! Both variants are local validation failures, reported synchronously to
//! the caller and never fatal to the process. Validation fully precedes
//! mutation, so a failed operation leaves no partial state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Network identifier not recognized under a closed policy
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    /// A required peer field was empty
    #[error("missing peer field: {0}")]
    MissingField(&'static str),
}
