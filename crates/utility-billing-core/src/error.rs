//! Error types for the billing core.

use rust_decimal::Decimal;

use crate::ids::IdError;

/// Result type for billing-core operations.
pub type Result<T> = std::result::Result<T, BillingError>;

/// Errors raised by the billing core.
///
/// Every error is a deterministic consequence of the inputs: retrying with the
/// same inputs reproduces the same failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillingError {
    /// A single malformed input value.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// The argument that was rejected.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A required reading or tariff was not supplied.
    #[error("missing reference: {0}")]
    MissingReference(&'static str),

    /// A tariff's step set is internally inconsistent.
    #[error("invalid tariff structure: {0}")]
    StructuralViolation(#[from] TariffError),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}

impl BillingError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// The broad category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } | Self::InvalidId(_) => ErrorKind::InvalidArgument,
            Self::MissingReference(_) => ErrorKind::MissingReference,
            Self::StructuralViolation(_) => ErrorKind::StructuralViolation,
        }
    }
}

/// Broad error category, for callers translating errors into responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed input value.
    InvalidArgument,
    /// A required collaborator object was absent.
    MissingReference,
    /// An internally inconsistent tariff.
    StructuralViolation,
}

/// Structural problems with a tariff's steps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TariffError {
    /// No steps were given.
    #[error("tariff must have at least one step")]
    Empty,

    /// Two steps share an upper limit.
    #[error("duplicate step upper limit: {0}")]
    DuplicateLimit(Decimal),

    /// Two steps are both unbounded.
    #[error("more than one unbounded step")]
    DuplicateUnbounded,

    /// The highest step has a finite limit, leaving usage above it unbillable.
    #[error("highest step must be unbounded")]
    MissingUnboundedStep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_variants() {
        assert_eq!(
            BillingError::invalid("rate", "negative").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            BillingError::MissingReference("water tariff").kind(),
            ErrorKind::MissingReference
        );
        assert_eq!(
            BillingError::from(TariffError::Empty).kind(),
            ErrorKind::StructuralViolation
        );
        assert_eq!(
            BillingError::from(IdError::InvalidUuid).kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn messages_name_the_argument() {
        let err = BillingError::invalid("opening", "must not be negative");
        assert_eq!(
            err.to_string(),
            "invalid argument `opening`: must not be negative"
        );
    }
}
