use thiserror::Error;

/// Precondition failures surfaced to the command layer.
///
/// Every command validates before it applies any state change, so a returned
/// error guarantees the world was not mutated. Numeric degeneracies (trivial
/// aggregate curves) are not errors; they yield empty equilibria instead.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("no {0} selected")]
    NoSelection(&'static str),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("{what} must be between {min} and {max}")]
    OutOfRange {
        what: &'static str,
        min: f64,
        max: f64,
    },

    #[error("income cannot be negative")]
    NegativeIncome,

    #[error("{0} is already employed")]
    AlreadyEmployed(String),

    #[error("the selected consumer owns no firm")]
    NoFirmOwned,
}

pub type KernelResult<T> = Result<T, KernelError>;
