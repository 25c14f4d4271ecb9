use std::process::ExitCode;

use clap::Parser;
use emojiasm::{Config, Driver};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(config.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut driver = Driver::new(config);

    match driver.run() {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            eprint!("{}", err.render());
            ExitCode::from(err.exit_code())
        }
    }
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "emojiasm=debug",
        _ => "emojiasm=trace",
    }
}
