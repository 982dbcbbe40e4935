//! CLI frontend for the Arcanum tarot reader.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "arcanum",
    about = "Arcanum: shuffle, draw, and read the tarot from your terminal",
    version,
    propagate_version = true
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where profiles and history live, and whose they are.
#[derive(Args, Clone)]
pub struct StoreArgs {
    /// User id for profile and history
    #[arg(short, long, env = "ARCANUM_USER", default_value = "traveler")]
    pub user: String,

    /// Data directory for profiles and history
    #[arg(long, env = "ARCANUM_DATA_DIR", default_value = ".arcanum")]
    pub data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive reading
    Read(commands::read::ReadArgs),

    /// List the cards of the deck
    Deck {
        /// Only cards of this suit (wands, cups, swords, pentacles, major)
        #[arg(short, long)]
        suit: Option<String>,
    },

    /// List the available spreads and their positions
    Spreads,

    /// View or edit your soul profile and reading preferences
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Show your recent readings
    History {
        /// Number of readings to show
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Print the stored profile
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Create or update the stored profile
    Set(commands::profile::SetArgs),
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Read(args) => commands::read::run(args),
        Commands::Deck { suit } => commands::deck::run(suit.as_deref()),
        Commands::Spreads => commands::spreads::run(),
        Commands::Profile { command } => match command {
            ProfileCommand::Show { json, store } => commands::profile::show(&store, json),
            ProfileCommand::Set(args) => commands::profile::set(args),
        },
        Commands::History { limit, json, store } => commands::history::run(&store, limit, json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
