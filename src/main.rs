// src/main.rs

use clap::error::ErrorKind;

use outwatch::errors::OutwatchError;
use outwatch::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = match cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                // Invalid syntax exits 1, not clap's default 2.
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let verbose = args.verbose;
    if let Err(err) = logging::init_logging(args.log_level, verbose) {
        eprintln!("outwatch error: {err:?}");
        std::process::exit(1);
    }

    match run(args).await {
        Ok(code) => std::process::exit(code),
        Err(OutwatchError::InvalidPattern(matchexpr)) => {
            cli::print_help();
            eprintln!("\nThe matchexpr {matchexpr} could not be evaluated");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("outwatch error: {err:?}");
            std::process::exit(1);
        }
    }
}
