//! Error taxonomy for the influence-factor pipeline.
//!
//! Only the genuinely fatal kinds from the pipeline's error taxonomy get a
//! variant here (`InputMissing`, `TopologyInvariant`, `Numerical`). The
//! "log and continue" kinds (`MalformedRecord`, `Degenerate`,
//! `PolicyWarning`) are not errors at all — they flow into a
//! [`gat_core::diagnostics::Diagnostics`] collection instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IfaError {
    #[error("input missing: {0}")]
    InputMissing(String),

    #[error("topology invariant violated: {0}")]
    TopologyInvariant(String),

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no external contingencies for country {0}")]
    EmptyExternalSet(String),
}

pub type IfaResult<T> = Result<T, IfaError>;

impl From<IfaError> for gat_core::GatError {
    fn from(err: IfaError) -> Self {
        match err {
            IfaError::InputMissing(m) => gat_core::GatError::Other(format!("input missing: {m}")),
            IfaError::Config(m) => gat_core::GatError::Config(m),
            other => gat_core::GatError::Solver(other.to_string()),
        }
    }
}
