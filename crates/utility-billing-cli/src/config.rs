//! CLI configuration.

use std::path::PathBuf;

use clap::Parser;

/// Configuration from command-line arguments, falling back to environment
/// variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(name = "utility-billing", version, about = "Compute a utility bill from a JSON request")]
pub struct CliConfig {
    /// Request file to read (default: stdin).
    #[arg(env = "BILLING_INPUT")]
    pub input: Option<PathBuf>,

    /// File to write the bill to (default: stdout).
    #[arg(short, long, env = "BILLING_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(short, long, env = "BILLING_PRETTY")]
    pub pretty: bool,
}

impl CliConfig {
    /// Create a configuration reading stdin and writing stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request file.
    #[must_use]
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Set the output file.
    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Enable or disable pretty-printed output.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
