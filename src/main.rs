use clap::Parser;
use std::process::ExitCode;

use summurai::cli::Cli;
use summurai::{logging, runtime};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    let rt = match runtime::build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("Failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    runtime::run_to_completion(rt, async move {
        tokio::spawn(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nExiting...");
                std::process::exit(1);
            }
        });

        match summurai::run(cli).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{err:#}");
                ExitCode::FAILURE
            }
        }
    })
}
