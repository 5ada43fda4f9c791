use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use recompose_shell::{run, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    run(&args, &mut stdout.lock())
}
