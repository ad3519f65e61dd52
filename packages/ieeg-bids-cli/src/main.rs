use clap::Parser;

mod cli;
mod commands;
mod exit_codes;
mod output;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let exit_code = match cli.command {
        cli::Command::Fields(args) => commands::fields::execute(args),
        cli::Command::Generate(args) => commands::generate::execute(args),
        cli::Command::Validate(args) => commands::validate::execute(args),
        cli::Command::Paths(args) => commands::paths::execute(args),
        cli::Command::Channels(args) => commands::channels::execute(args),
        cli::Command::Dataset(command) => commands::dataset::execute(command),
    };

    std::process::exit(exit_code);
}
