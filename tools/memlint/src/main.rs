mod app;
mod args;

use std::process;
use std::sync::Arc;

use args::{parse_args, Config, ParseOutcome};
use common::adapter::{HumanLog, StdEnvResolver, StdFileSystem};
use common::error::Error;
use common::ports::outbound::LogLevel;

fn run(config: &Config) -> Result<i32, Error> {
    let max_level = if config.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let report = app::run(
        config,
        Arc::new(StdFileSystem),
        &StdEnvResolver,
        Arc::new(HumanLog::stderr(max_level)),
    )?;
    println!("{}", report.summary());
    Ok(report.exit_code(config.strict))
}

fn main() {
    let code = match parse_args(std::env::args_os()) {
        Ok(ParseOutcome::Display(text)) => {
            print!("{}", text);
            0
        }
        Ok(ParseOutcome::Config(config)) => match run(&config) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("memlint: {}", e);
                e.exit_code()
            }
        },
        Err(e) => {
            eprintln!("memlint: {}", e);
            e.exit_code()
        }
    };
    process::exit(code);
}
