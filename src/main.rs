//! Packet Shield - Main Entry Point

use std::io::Write;
use clap::Parser;

mod cli;
mod commands;
mod logic;
pub mod constants;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    // Logs on stderr; "\r\n" keeps lines aligned while the terminal is raw
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:<5} {}] {}\r",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    log::debug!("{} v{}", constants::APP_NAME, constants::APP_VERSION);

    let exit_code = match cli.command {
        cli::Command::Demo(args) => commands::demo::execute(args),
        cli::Command::Check(args) => commands::check::execute(args),
        cli::Command::Layout(args) => commands::layout::execute(args),
    };

    std::process::exit(exit_code);
}
