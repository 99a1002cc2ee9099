use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::calendar::parse_month_selection;
use crate::config::Config;
use crate::filter::{ActivityToggles, FilterState};
use crate::schema::Category;
use crate::timeline::{SortOrder, TimelineOptions};

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "planter",
    version,
    about = "Planter: seasonal planting calendar for the terminal",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the per-category CSV files.
    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Draw the planting timeline for one category.
    Chart(FilterArgs),
    /// List the rows that pass the filters.
    List(FilterArgs),
    /// Show the growing details of one plant.
    Info {
        name: String,
        #[arg(long, value_enum)]
        category: Option<Category>,
        #[arg(long)]
        json: bool,
    },
    /// Light values present in a category.
    Lights {
        #[arg(long, value_enum)]
        category: Option<Category>,
    },
    /// Known categories and their data files.
    Categories,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(short = 'c', long, value_enum)]
    pub category: Option<Category>,

    /// Case-insensitive substring of the plant name.
    #[arg(short = 's', long)]
    pub search: Option<String>,

    /// `all`, 1-12, or a month name.
    #[arg(short = 'm', long)]
    pub month: Option<String>,

    #[arg(long)]
    pub primary: bool,

    #[arg(long = "plant-out")]
    pub plant_out: bool,

    #[arg(long)]
    pub flower: bool,

    #[arg(short = 'l', long = "light", action = ArgAction::Append)]
    pub light: Vec<String>,

    #[arg(long, value_enum)]
    pub sort: Option<SortOrder>,

    #[arg(long)]
    pub json: bool,
}

impl FilterArgs {
    pub fn category(&self, cfg: &Config) -> Category {
        self.category.unwrap_or_else(|| cfg.category())
    }

    /// Activity toggles picked on the command line. Without any flag every
    /// class is on.
    pub fn toggles(&self) -> ActivityToggles {
        let picked = ActivityToggles {
            primary: self.primary,
            plant_out: self.plant_out,
            flower: self.flower,
        };
        if picked.any() { picked } else { ActivityToggles::all() }
    }

    #[tracing::instrument(skip(self))]
    pub fn filter_state(&self) -> anyhow::Result<FilterState> {
        let month = match self.month.as_deref() {
            Some(raw) => parse_month_selection(raw)?,
            None => None,
        };

        let light_types: BTreeSet<String> = self
            .light
            .iter()
            .map(|light| light.trim().to_string())
            .filter(|light| !light.is_empty())
            .collect();

        let state = FilterState {
            query: self.search.clone().unwrap_or_default(),
            month,
            activities: self.toggles(),
            light_types,
        };
        debug!(?state, "built filter state");
        Ok(state)
    }

    pub fn timeline_options(&self, cfg: &Config, year: i32) -> TimelineOptions {
        TimelineOptions {
            sort: self.sort.unwrap_or_else(|| cfg.sort_order()),
            visible: self.toggles(),
            year,
        }
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` and `rc.key:value` overrides out of the
/// argument list before clap sees it.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> PreprocessedArgs {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = rest.split_once('=').or_else(|| rest.split_once(':'));
            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((format!("rc.{k}"), v.to_string()));
                continue;
            }
        }

        cleaned.push(arg);
    }

    PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    }
}
