//! GlucoTrack CLI.

use clap::Parser;
use gt_cli::cli::Cli;
use gt_cli::commands::{run, validation_failure};
use gt_cli::logging::{LogConfig, init_logging};
use gt_cli::summary::render_validation;

const EXIT_ERROR: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = LogConfig::from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_ERROR);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => match validation_failure(&error) {
            Some(validation) => {
                eprintln!("{}", render_validation(validation));
                EXIT_INVALID_INPUT
            }
            None => {
                eprintln!("error: {error:#}");
                EXIT_ERROR
            }
        },
    };
    std::process::exit(exit_code);
}
