use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cdrfetch::commands;
use cdrfetch::core::config::{Overrides, Settings};
use cdrfetch::core::dataset::CDR_CORPUS;

#[derive(Parser)]
#[clap(name = "cdrfetch")]
#[clap(about = "Download the BioCreative V CDR corpus into the data directory")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(flatten)]
    settings: SettingsArgs,

    /// Enable debug logging
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct SettingsArgs {
    /// Archive URL (default: the BioCreative download)
    #[clap(long, global = true)]
    url: Option<String>,
    /// Directory that receives the BioC files; must already exist
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Ephemeral working directory for the download
    #[clap(long, global = true)]
    staging_dir: Option<PathBuf>,
    /// Append a per-run identifier to the staging directory
    #[clap(long, global = true)]
    unique_staging: bool,
    /// Path to a TOML config file (default: ./cdrfetch.toml if present)
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, extract and place the corpus (the default)
    Fetch,
    /// Show which corpus files are present in the data directory
    Status {
        /// Output format: text or json
        #[clap(short, long, default_value = "text")]
        format: String,
    },
    /// Remove staging directories left behind by failed runs
    Clean {
        /// Actually remove them (without this flag, shows what would be removed)
        #[clap(long)]
        confirm: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(args: SettingsArgs) -> Result<Settings> {
    let settings = Settings::load(args.config.as_deref())?.with_overrides(Overrides {
        url: args.url,
        staging_dir: args.staging_dir,
        data_dir: args.data_dir,
        unique_staging: args.unique_staging,
    });
    settings.validate()?;
    Ok(settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_settings(cli.settings).and_then(|settings| {
        match cli.command.unwrap_or(Commands::Fetch) {
            Commands::Fetch => commands::fetch::fetch_dataset(&settings).map(|_| ()),
            Commands::Status { format } => {
                commands::status::show_status(&CDR_CORPUS, &settings.data_dir, &format)
            }
            Commands::Clean { confirm } => {
                if confirm {
                    commands::clean::clean_execute(&settings).map(|_| ())
                } else {
                    commands::clean::clean_dry_run(&settings)
                }
            }
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
