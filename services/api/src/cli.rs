use crate::commands::{run_assess, run_evaluate, run_questions, AssessArgs, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use gpai_assess::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "GPAI Assessment",
    about = "Assess general-purpose AI models against EU AI Act provider obligations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print every question with its permitted answers
    Questions,
    /// Walk through the questionnaire interactively and export the report
    Assess(AssessArgs),
    /// Evaluate a JSON response set without prompting
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Questions => run_questions(),
        Command::Assess(args) => run_assess(args),
        Command::Evaluate(args) => run_evaluate(args),
    }
}
