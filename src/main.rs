//! revu - a minimal local version control engine
//!
//! This is the main entry point for the revu command-line interface.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use revu::repo::{render_commit_diff, render_log_entry, Palette, Revu, RevuConfig, RevuResult};
use revu::storage::InitStatus;

/// Minimal content-addressed version control.
#[derive(Parser)]
#[command(name = "revu")]
#[command(version)]
#[command(about = "Minimal content-addressed version control")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Repository root.
    #[arg(short = 'C', long = "repo", default_value = ".", global = true)]
    repo: PathBuf,

    /// Enable verbose logging.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// When to colour output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn palette(self) -> Palette {
        match self {
            ColorChoice::Always => Palette::colored(),
            ColorChoice::Never => Palette::plain(),
            ColorChoice::Auto if std::io::stdout().is_terminal() => Palette::colored(),
            ColorChoice::Auto => Palette::plain(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create the repository layout (safe to run again).
    Init,

    /// Store a file and stage it for the next commit.
    Add {
        /// File to add.
        file: PathBuf,
    },

    /// Record the staged files as a new commit.
    Commit {
        /// Commit message.
        message: String,
    },

    /// List commits from HEAD back to the first one.
    Log {
        /// Show at most this many commits.
        #[arg(short = 'n', long = "limit")]
        limit: Option<usize>,
    },

    /// Show a commit's files and their diff against the parent.
    Show {
        /// Digest of the commit.
        digest: String,
    },

    /// Summarize HEAD, object count and staged files.
    Status,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli) -> RevuResult<()> {
    let palette = cli.color.palette();
    let config = RevuConfig::new(&cli.repo).verbose(cli.verbose);

    match cli.command {
        Command::Init => {
            let (revu, status) = Revu::init(config)?;
            match status {
                InitStatus::Created => println!(
                    "Initialized empty revu repository in {}",
                    revu.repository().layout().control.display()
                ),
                InitStatus::AlreadyInitialized => println!("Already initialized the .revu folder"),
            }
        }
        Command::Add { file } => {
            let revu = Revu::open_with_config(config)?;
            let entry = revu.add(&file)?;
            println!("{}", entry.hash);
            println!("Added {}", file.display());
        }
        Command::Commit { message } => {
            let revu = Revu::open_with_config(config)?;
            let digest = revu.commit(&message)?;
            println!("Commit Successfully created: {}", digest);
        }
        Command::Log { limit } => {
            let revu = Revu::open_with_config(config)?;
            for (digest, commit) in revu.log(limit)? {
                print!("{}", render_log_entry(&digest, &commit, palette));
            }
        }
        Command::Show { digest } => {
            let revu = Revu::open_with_config(config)?;
            let diff = revu.show(&digest)?;
            print!("{}", render_commit_diff(&diff, palette));
        }
        Command::Status => {
            let revu = Revu::open_with_config(config)?;
            let (stats, staged) = revu.status()?;
            println!("{}", stats);
            for entry in staged {
                println!("  {} {}", entry.hash.short(), entry.path);
            }
        }
    }

    Ok(())
}
