use anyhow::Result;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    shell_tools_cli::run_cli()
}
