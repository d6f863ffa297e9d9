//! Mixa command-line front end
//!
//! Feeds a JSON-lines stream of test run events to one of the built-in
//! reporters, and inspects how the reporter classes are assembled.

use clap::{Parser, Subcommand};
use mixa_test::registry::DEFAULT_REPORTER;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "mixa")]
#[command(about = "Mixin-based test reporters", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report a stream of test run events
    Report {
        /// JSON-lines event file (stdin when omitted)
        file: Option<String>,
        /// Reporter to use
        #[arg(short, long, default_value = DEFAULT_REPORTER)]
        reporter: String,
        /// Color output: auto, always, never
        #[arg(long, default_value = "auto")]
        color: String,
    },

    /// List available reporters
    Reporters,

    /// Show the ancestor chain of each reporter class
    Ancestors {
        /// Only this reporter
        reporter: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("MIXA_LOG", "warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            file,
            reporter,
            color,
        } => commands::report::execute(commands::report::ReportArgs {
            file,
            reporter,
            color,
        }),

        Commands::Reporters => commands::reporters::execute(),

        Commands::Ancestors { reporter, json } => {
            commands::ancestors::execute(reporter.as_deref(), json)
        }
    }
}
