use clap::Parser;
use std::process::ExitCode;

mod cli;

#[derive(Debug, Parser)]
#[command(name = "tundns", about = "DNS configuration for a managed tunnel interface")]
struct ProgramArgs {
    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: cli::SubCommand,
}

fn main() -> ExitCode {
    let args: ProgramArgs = ProgramArgs::parse();
    if let Err(e) = tundns::external::init_tracing(args.verbose) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    match cli::run(args.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
