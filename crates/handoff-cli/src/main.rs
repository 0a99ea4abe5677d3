//! Handoff CLI - drive the native ownership protocol from the command line
//!
//! Every subcommand makes one or more native calls through the marshaller
//! and prints the owned copies it gets back.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::{Error, Result};
use handoff_marshal::Marshaller;
use logging::{timing::Timer, LogSettings};
use output::OutputWriter;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Config comes first so its logging section can shape the subscriber
    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config.resolve(&cli),
        Err(e) => exit_with(e, cli.use_color(), None),
    };

    let use_color = cli.use_color() && config.output.color;
    control::set_override(use_color);

    let guard = match init_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    match run(cli, config, use_color).await {
        Ok(()) => {
            drop(guard);
            process::exit(0);
        }
        Err(e) => exit_with(e, use_color, guard),
    }
}

fn exit_with(e: Error, use_color: bool, guard: Option<tracing_appender::non_blocking::WorkerGuard>) -> ! {
    tracing::error!(error = %e, exit_code = e.exit_code(), "command failed");
    // Flush the log file before the process goes away
    drop(guard);

    eprintln!("{}", error::format_error(&e, use_color));
    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }
    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    // Completions never touch the native library
    let command = match cli.command {
        Commands::Completions(args) => return handlers::handle_completions(args),
        command => command,
    };

    let marshaller = {
        let _library_timer = Timer::new("library_loading");
        Marshaller::from_config(config.marshal.clone())?
    };
    tracing::info!(
        version = %marshaller.version(),
        origin = ?marshaller.library().origin(),
        fail_on_error = marshaller.config().fail_on_error,
        "native library ready"
    );

    let mut output = OutputWriter::new(cli.output, use_color, cli.quiet, config.output.progress);

    match command {
        Commands::Factorial(args) => handlers::handle_factorial(args, &marshaller, &mut output),
        Commands::Greet(args) => handlers::handle_greet(args, &marshaller, &mut output),
        Commands::Fib(args) => handlers::handle_fib(args, &marshaller, &mut output),
        Commands::Repeat(args) => handlers::handle_repeat(args, &marshaller, &mut output),
        Commands::User(args) => handlers::handle_user(args, &marshaller, &mut output),
        Commands::Users(args) => handlers::handle_users(args, &marshaller, &mut output),
        Commands::Spellcheck(args) => handlers::handle_spellcheck(args, &marshaller, &mut output),
        Commands::Scrape(args) => handlers::handle_scrape(args, &config, &marshaller, &mut output).await,
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let mut settings = LogSettings::from_verbosity(cli.verbosity_level())
        .merge_with_config(&config.logging)
        .merge_with_env();

    if cli.quiet {
        settings.level = "error".to_string();
    }

    logging::init_logging(settings)
}
