use std::{fs::File, path::Path, sync::Arc};

use env_logger::Env;
use httpcache::{
    api_defaults::{DEFAULT_CACHE_DIR, DEFAULT_CONFIG_PATH},
    cli::{parse_cli, CliOptions},
    cmds,
    config::{Config, ConfigProperties},
    error::{self, AddContext},
    Result,
};

fn main() -> Result<()> {
    let option_args = parse_cli();
    let cli_args = option_args.cli_args;
    if cli_args.verbose {
        let env = Env::default().default_filter_or("info");
        env_logger::init_from_env(env);
    }
    let home_dir = std::env::var("HOME").err_context("HOME environment variable not set")?;
    let mut config = match cli_args.config {
        Some(path) => {
            let f = File::open(&path).err_context(format!("Unable to open config file {path}"))?;
            Config::new(f)?
        }
        None => {
            let path = Path::new(&home_dir).join(DEFAULT_CONFIG_PATH);
            match File::open(path) {
                Ok(f) => Config::new(f)?,
                Err(_) => Config::default(),
            }
        }
    };
    if config.cache_location().is_none() {
        let location = Path::new(&home_dir).join(DEFAULT_CACHE_DIR);
        std::fs::create_dir_all(&location).err_context(format!(
            "Unable to create cache directory {}",
            location.to_string_lossy()
        ))?;
        let location = location
            .to_str()
            .ok_or_else(|| error::gen("Cache directory is not valid UTF-8"))?;
        config.set_cache_location(location);
    }
    let config = Arc::new(config);
    let mut stdout = std::io::stdout().lock();
    match option_args.cli_options {
        CliOptions::Fetch(options) => cmds::fetch::execute(options, config, &mut stdout),
        CliOptions::Cache(options) => cmds::cache::execute(options, config, &mut stdout),
    }
}
