mod commands;

use clap::Parser;
use loadest_core::domain::LoadestError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let rendered = error.as_loadest_error();
            eprintln!("{}", rendered.diagnostic_line());
            if let Some(summary_line) = rendered.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            rendered.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
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
#[command(name = "loadest-rs", about = "LOADEST configuration and result translator")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Generate the four LOADEST input files from a run specification
    Conf(commands::ConfArgs),
    /// Parse LOADEST output, convert units and merge with observations
    Post(commands::PostArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Conf(args) => commands::run_conf_command(args),
        CliCommand::Post(args) => commands::run_post_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Core(LoadestError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_loadest_error(&self) -> LoadestError {
        match self {
            Self::Usage(message) => LoadestError::schema("INPUT.CLI_USAGE", message.clone()),
            Self::Core(error) => error.clone(),
            Self::Internal(error) => LoadestError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
