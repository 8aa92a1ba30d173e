use clap::Parser;
use trackd::TrackerError;
use trackd::cli::{self, Cli};
use trackd::logging::init_logging;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {e}");
        // Continue without logging rather than refuse to run
    }

    if let Err(e) = cli::run(cli) {
        handle_error(&e);
    }
}

fn handle_error(err: &TrackerError) -> ! {
    eprintln!("Error: {err}");
    if !err.is_user_recoverable() {
        tracing::error!("backend failure: {err}");
    }
    std::process::exit(err.exit_code());
}
