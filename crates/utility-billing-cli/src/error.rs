//! CLI error types.

use utility_billing_core::{BillingError, ErrorKind};

/// Exit code for malformed input data (`EX_DATAERR`).
pub const EXIT_DATA_ERROR: u8 = 65;

/// Exit code for I/O failures (`EX_IOERR`).
pub const EXIT_IO_ERROR: u8 = 74;

/// Errors that can occur while processing a bill request.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading the request or writing the bill failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request is not valid JSON or has the wrong shape.
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),

    /// The billing core rejected the request.
    #[error("{0}")]
    Billing(#[from] BillingError),
}

impl CliError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Io(_) => EXIT_IO_ERROR,
            Self::Json(_) | Self::Billing(_) => EXIT_DATA_ERROR,
        }
    }

    /// Short machine-readable code, as the HTTP layer would report it.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            Self::Json(_) => "bad_request",
            Self::Billing(err) => match err.kind() {
                ErrorKind::InvalidArgument => "invalid_argument",
                ErrorKind::MissingReference => "missing_reference",
                ErrorKind::StructuralViolation => "invalid_tariff",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utility_billing_core::TariffError;

    #[test]
    fn billing_errors_are_data_errors() {
        let err = CliError::from(BillingError::MissingReference("water tariff"));
        assert_eq!(err.exit_code(), EXIT_DATA_ERROR);
        assert_eq!(err.code(), "missing_reference");
        assert_eq!(err.to_string(), "missing reference: water tariff");
    }

    #[test]
    fn structural_errors_have_their_own_code() {
        let err = CliError::from(BillingError::from(TariffError::Empty));
        assert_eq!(err.code(), "invalid_tariff");
    }

    #[test]
    fn io_errors_use_io_exit_code() {
        let err = CliError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.exit_code(), EXIT_IO_ERROR);
    }
}
