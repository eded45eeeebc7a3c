use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = passvault::cli::Cli::parse();
    passvault::cli::init_tracing(cli.verbose);
    cli.run()
}
