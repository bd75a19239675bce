use clap::Parser;
use clap::error::ErrorKind;
use coinconv::cli::convert::{format_error, format_result, parse_args, usage_text};
use coinconv::core::log::init_logging;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

const EXIT_USAGE: u8 = 1;
const EXIT_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(version, about, allow_negative_numbers = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,

    /// Write an example configuration file and exit
    #[arg(long)]
    init_config: bool,

    /// <amount> <from> <to>, e.g. 123.45 USD BTC
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("{}", usage_text());
            return ExitCode::from(EXIT_USAGE);
        }
    };

    init_logging(cli.verbose);

    if cli.init_config {
        return match coinconv::cli::setup::setup(cli.config_path.as_deref()) {
            Ok(path) => {
                println!("Created configuration at {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "Setup failed");
                println!("{}", format_error(&e));
                ExitCode::from(EXIT_FAILURE)
            }
        };
    }

    let args = match parse_args(&cli.args) {
        Ok(args) => args,
        Err(e) => {
            println!("{e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match coinconv::run_convert(&args, cli.config_path.as_deref(), &cancel).await {
        Ok(ratio) => {
            println!("{}", format_result(ratio));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Conversion failed");
            println!("{}", format_error(&e));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
