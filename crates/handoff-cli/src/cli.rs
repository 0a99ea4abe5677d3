//! Command-line interface argument parsing and definitions
//!
//! Each subcommand drives one shape of the ownership protocol through the
//! marshaller: plain values, single records, and counted arrays.

use clap::{Args, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Handoff CLI - exercise native allocations from the caller's side
///
/// Every command calls a native entry point, copies the result into owned
/// values, and releases the native memory before printing.
#[derive(Parser, Debug)]
#[command(
    name = "handoff",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file (YAML, JSON or TOML)
    #[arg(short, long, global = true, env = "HANDOFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Load this built native library instead of the linked entry points
    #[arg(long, global = true, value_name = "PATH")]
    pub library: Option<PathBuf>,

    /// Fail on the first degenerate array element instead of dropping it
    #[arg(long, global = true)]
    pub fail_on_error: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute n! natively
    Factorial(FactorialArgs),

    /// Ask the native side for a greeting
    Greet(GreetArgs),

    /// First n Fibonacci numbers as a native array
    Fib(FibArgs),

    /// Repeat a string into a native array of strings
    Repeat(RepeatArgs),

    /// Build one user record
    User(UserArgs),

    /// Build a batch of random user records
    Users(UsersArgs),

    /// Suggest dictionary words for possibly misspelled input
    Spellcheck(SpellcheckArgs),

    /// Fetch metadata for one or more URLs
    Scrape(ScrapeArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the factorial command
#[derive(Args, Debug)]
pub struct FactorialArgs {
    /// Input value; negative or overflowing inputs yield 0
    #[arg(allow_negative_numbers = true)]
    pub n: i32,
}

/// Arguments for the greet command
#[derive(Args, Debug)]
pub struct GreetArgs {
    /// Name to greet
    pub name: String,
}

/// Arguments for the fib command
#[derive(Args, Debug)]
pub struct FibArgs {
    /// How many numbers to produce
    pub n: usize,
}

/// Arguments for the repeat command
#[derive(Args, Debug)]
pub struct RepeatArgs {
    /// Text to repeat
    pub text: String,

    /// Number of copies
    #[arg(short = 'n', long, default_value = "3")]
    pub count: usize,
}

/// Arguments for the user command
#[derive(Args, Debug)]
pub struct UserArgs {
    /// Generate every field randomly
    #[arg(long, conflicts_with_all = ["name", "age", "email"])]
    pub random: bool,

    /// Full name
    #[arg(long, required_unless_present = "random")]
    pub name: Option<String>,

    /// Age in years
    #[arg(long, required_unless_present = "random")]
    pub age: Option<i32>,

    /// Email address
    #[arg(long, required_unless_present = "random")]
    pub email: Option<String>,
}

/// Arguments for the users command
#[derive(Args, Debug)]
pub struct UsersArgs {
    /// Number of users to generate
    #[arg(short = 'n', long, default_value = "5")]
    pub count: usize,
}

/// Arguments for the spellcheck command
#[derive(Args, Debug)]
pub struct SpellcheckArgs {
    /// Words to check
    #[arg(required = true)]
    pub words: Vec<String>,

    /// Rank candidates by normalized Levenshtein instead of Jaro-Winkler
    #[arg(long, conflicts_with = "batch")]
    pub levenshtein: bool,

    /// Check all words in a single native array call
    #[arg(long)]
    pub batch: bool,
}

/// Arguments for the scrape command
#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// URLs to fetch
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Fetch all URLs in a single native array call
    #[arg(long, conflicts_with = "concurrent")]
    pub batch: bool,

    /// Run one native call per URL on the worker pool
    #[arg(long)]
    pub concurrent: bool,

    /// Worker pool size for --concurrent (overrides config)
    #[arg(long, requires = "concurrent")]
    pub workers: Option<usize>,

    /// Per-call timeout in seconds for --concurrent (overrides config)
    #[arg(long, requires = "concurrent")]
    pub timeout: Option<u64>,
}

/// Arguments for generating shell completions
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
