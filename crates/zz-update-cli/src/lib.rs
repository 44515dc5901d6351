mod config;
mod show;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory as _, Parser};
use zz_update::commit::{Prompt, Tools};
use zz_update::{Classifier, Layout};

pub use config::Config;
pub use show::{Styles, update};

#[derive(Parser)]
#[command(
    name = "zz-update",
    about = "Update zeiterfassung.txt files with getan entries"
)]
struct Args {
    /// Shorthand to use in zeiterfassung.txt
    shorthand: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Number of days to look back
    #[arg(short, long, default_value_t = 7)]
    days: u32,

    /// Automatically add the entries to the destination files
    #[arg(short, long)]
    automatic: bool,

    /// Config file path. Defaults to zz-update.toml in the current or the user's config directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// getan database path [default: ~/.getan/time.db]
    #[arg(long)]
    database: Option<PathBuf>,
}

/// Everything one run needs, fixed before any entry is looked at.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: PathBuf,
    pub days: u32,
    pub today: NaiveDate,
    pub shorthand: String,
    pub verbose: bool,
    pub automatic: bool,
    pub classifier: Classifier,
    pub layout: Layout,
    pub tools: Tools,
    pub styles: Styles,
}

pub fn run(args: impl IntoIterator<Item = String>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zz_update=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    clap_complete::CompleteEnv::with_factory(Args::command).complete();

    let args = Args::parse_from(args);
    let (base_dir, config) = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::find_and_load()?.unwrap_or_default(),
    };

    let settings = Settings {
        database: match args.database {
            Some(database) => database,
            None => config.database(&base_dir)?,
        },
        days: args.days,
        today: chrono::Local::now().date_naive(),
        shorthand: args.shorthand,
        verbose: args.verbose,
        automatic: args.automatic,
        classifier: config.classifier(),
        layout: config.layout(&base_dir)?,
        tools: config.tools(),
        styles: Styles::from_env(),
    };

    let mut stdout = std::io::stdout().lock();
    update(&settings, &mut stdout, &mut Prompt::stdio())
}
