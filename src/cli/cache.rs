use clap::Parser;

#[derive(Parser)]
pub struct CacheCommand {
    #[clap(subcommand)]
    subcommand: CacheSubcommand,
}

#[derive(Parser)]
enum CacheSubcommand {
    #[clap(name = "info", about = "Get local cache size and location")]
    Info,
    #[clap(name = "show", about = "Print the stored response for a URL")]
    Show(UrlArg),
    #[clap(name = "evict", about = "Remove the stored response for a URL")]
    Evict(UrlArg),
}

#[derive(Parser)]
struct UrlArg {
    /// URL the response was stored for
    #[clap()]
    url: String,
}

pub enum CacheOptions {
    Info,
    Show { url: String },
    Evict { url: String },
}

impl From<CacheCommand> for CacheOptions {
    fn from(options: CacheCommand) -> Self {
        match options.subcommand {
            CacheSubcommand::Info => CacheOptions::Info,
            CacheSubcommand::Show(arg) => CacheOptions::Show { url: arg.url },
            CacheSubcommand::Evict(arg) => CacheOptions::Evict { url: arg.url },
        }
    }
}
