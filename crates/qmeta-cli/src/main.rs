//! Questionnaire metadata CLI.

use clap::Parser;
use qmeta_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command};
use crate::commands::{run_catalog, run_map, run_rules, run_score};
use crate::summary::{
    print_catalog_report, print_map_report, print_rules_report, print_score_report,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Map(args) => report(run_map(args), print_map_report),
        Command::Catalog(args) => report(run_catalog(args), print_catalog_report),
        Command::Rules(args) => match run_rules(args) {
            Ok(result) => {
                print_rules_report(&result);
                i32::from(!result.rejected.is_empty())
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Score(args) => report(run_score(args), print_score_report),
    };
    std::process::exit(exit_code);
}

fn report<T>(result: anyhow::Result<T>, print: fn(&T)) -> i32 {
    match result {
        Ok(value) => {
            print(&value);
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}
