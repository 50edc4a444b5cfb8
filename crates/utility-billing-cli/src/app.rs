//! Request processing.

use std::io::{Read, Write};

use serde::Serialize;
use utility_billing_core::{Bill, LineItem};

use crate::config::CliConfig;
use crate::error::CliError;
use crate::request::BillRequest;

/// The rendered output: the bill plus its per-utility lines.
#[derive(Debug, Serialize)]
pub struct BillReport<'a> {
    /// The computed bill.
    #[serde(flatten)]
    pub bill: &'a Bill,

    /// One line per utility, in bill order.
    pub line_items: [LineItem; 3],
}

impl<'a> BillReport<'a> {
    /// Build the report for `bill`.
    #[must_use]
    pub fn new(bill: &'a Bill) -> Self {
        Self {
            bill,
            line_items: bill.line_items(),
        }
    }
}

/// Parse a JSON request, compute the bill and render it as JSON.
///
/// # Errors
///
/// Returns `CliError::Json` for malformed input and `CliError::Billing` for
/// requests the core rejects.
pub fn process(input: &str, pretty: bool) -> Result<String, CliError> {
    let request: BillRequest = serde_json::from_str(input)?;
    tracing::debug!(invoice_number = %request.invoice_number, "Request parsed");

    let bill = request.to_bill()?;
    tracing::info!(
        invoice_number = %bill.invoice_number(),
        property_id = %bill.property_id(),
        total = %bill.total(),
        "Bill created"
    );

    let report = BillReport::new(&bill);
    let rendered = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(rendered)
}

/// Run the CLI: read the request, process it, write the bill.
///
/// # Errors
///
/// Returns `CliError::Io` if the input cannot be read or the output written,
/// otherwise anything [`process`] returns.
pub fn run(config: &CliConfig) -> Result<(), CliError> {
    let input = match &config.input {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Reading request file");
            std::fs::read_to_string(path)?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let rendered = process(&input, config.pretty)?;

    match &config.output {
        Some(path) => {
            std::fs::write(path, rendered + "\n")?;
            tracing::debug!(path = %path.display(), "Bill written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}")?;
        }
    }

    Ok(())
}
