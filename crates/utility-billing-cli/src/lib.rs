//! Command-line bill calculator.
//!
//! Reads a JSON bill request, builds a [`utility_billing_core::Bill`] from it
//! and writes the computed bill back out as JSON. This crate is the caller the
//! core expects: it owns I/O, configuration and logging setup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod app;
pub mod config;
pub mod error;
pub mod request;

pub use app::{process, run, BillReport};
pub use config::CliConfig;
pub use error::CliError;
pub use request::{BillRequest, StepRequest, TariffRequest, UtilityRequest};
