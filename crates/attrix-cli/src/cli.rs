use std::path::PathBuf;

use clap::Parser;

/// Fetches attribution reports and emits warehouse-shaped batch responses.
///
/// Reads a batch request (`{"data": [[id, app_token, start, end], ...]}`)
/// from a file or stdin and prints the batch response to stdout. The bearer
/// token comes from `ATTRIX_ADJUST_API_TOKEN`.
#[derive(Debug, Parser)]
#[command(name = "attrix", version)]
pub struct Cli {
    /// Path to the batch request JSON; omit to read stdin.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Pretty-print the batch response.
    #[arg(long)]
    pub pretty: bool,

    /// Override the upstream report endpoint (testing only).
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}
