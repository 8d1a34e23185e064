pub mod cache;
pub mod fetch;

use clap::Parser;

use self::cache::{CacheCommand, CacheOptions};
use self::fetch::{FetchCliArgs, FetchCommand};

#[derive(Parser)]
#[command(about = "HTTP client backed by a private RFC 7234 cache", version)]
struct Args {
    #[clap(subcommand)]
    pub command: Command,
    /// Configuration file. Defaults to $HOME/.config/httpcache/config
    #[clap(long, global = true, value_name = "FILE")]
    pub config: Option<String>,
    /// Verbose mode. Logs cache decisions to stderr
    #[clap(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Parser)]
enum Command {
    #[clap(about = "Perform an HTTP request through the cache")]
    Fetch(FetchCommand),
    #[clap(about = "Inspect and manage stored responses")]
    Cache(CacheCommand),
}

pub enum CliOptions {
    Fetch(FetchCliArgs),
    Cache(CacheOptions),
}

/// Arguments shared by all subcommands.
pub struct CliArgs {
    pub config: Option<String>,
    pub verbose: bool,
}

pub struct OptionArgs {
    pub cli_options: CliOptions,
    pub cli_args: CliArgs,
}

// Parse cli and return CliOptions
pub fn parse_cli() -> OptionArgs {
    let args = Args::parse();
    let cli_args = CliArgs {
        config: args.config,
        verbose: args.verbose,
    };
    let cli_options = match args.command {
        Command::Fetch(sub_matches) => CliOptions::Fetch(sub_matches.into()),
        Command::Cache(sub_matches) => CliOptions::Cache(sub_matches.into()),
    };
    OptionArgs {
        cli_options,
        cli_args,
    }
}
