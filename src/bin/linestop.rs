use std::process::ExitCode;

use anyhow::Result;
use linestop::cli::run;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    run().await
}
