mod commands;
mod helpers;

use clap::Parser;
use lazymole_core::domain::MoleError;

pub fn run_from_env() -> i32 {
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let mole_error = error.as_mole_error();
            eprintln!("{}", mole_error.diagnostic_line());
            if let Some(output) = mole_error.captured_output() {
                eprintln!("--- solver output ---");
                eprintln!("{}", output.trim_end());
                eprintln!("--- end of solver output ---");
            }
            eprintln!("{}", mole_error.fatal_exit_line());
            mole_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("lazymole-rs".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_tracing(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "lazymole-rs",
    version,
    about = "Prepare, run and read LazyMole hydraulic-connectivity analyses"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Build a channel run bundle (inlet plane to outlet plane) and run the solver
    Channel(commands::ChannelArgs),
    /// Verify that an existing run directory is internally consistent
    Check(commands::CheckArgs),
    /// Parse a saved solver console log and optionally write the run summary
    Extract(commands::ExtractArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Channel(args) => commands::run_channel_command(args),
        CliCommand::Check(args) => commands::run_check_command(args),
        CliCommand::Extract(args) => commands::run_extract_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(MoleError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<MoleError> for CliError {
    fn from(error: MoleError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_mole_error(&self) -> MoleError {
        match self {
            Self::Usage(message) => MoleError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => MoleError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
