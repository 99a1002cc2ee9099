use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use clap::ValueEnum;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::schema::Category;
use crate::timeline::SortOrder;

const CONFIG_ENV_VAR: &str =
  "PLANTER_CONFIG";
const CONFIG_DIR_NAME: &str = "planter";
const CONFIG_FILE_NAME: &str =
  "planter.toml";

#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize
)]
#[serde(default)]
pub struct Config {
  pub data:        DataSection,
  pub view:        ViewSection,
  pub calendar:    CalendarSection,
  #[serde(skip)]
  pub loaded_file: Option<PathBuf>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize
)]
#[serde(default)]
pub struct DataSection {
  pub location: String
}

impl Default for DataSection {
  fn default() -> Self {
    Self {
      location: ".".to_string()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize
)]
#[serde(default)]
pub struct ViewSection {
  pub category: String,
  pub sort:     String,
  pub color:    bool
}

impl Default for ViewSection {
  fn default() -> Self {
    Self {
      category: Category::AnnualSeed
        .slug()
        .to_string(),
      sort:     "name-asc".to_string(),
      color:    true
    }
  }
}

#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize
)]
#[serde(default)]
pub struct CalendarSection {
  pub timezone: Option<String>,
  /// Pins the reference year instead of
  /// using the current one.
  pub year:     Option<i32>
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) = resolve_config_path(
      config_override
    ) else {
      debug!(
        "no config file found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let mut cfg: Config =
      toml::from_str(&text)
        .with_context(|| {
          format!(
            "failed to parse {}",
            path.display()
          )
        })?;
    cfg.loaded_file = Some(path);
    Ok(cfg)
  }

  /// Applies `key=value` overrides on
  /// top of the loaded file. Keys are
  /// dotted section paths; an `rc.`
  /// prefix is ignored.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key =
        k.strip_prefix("rc.").unwrap_or(&k);
      let value = v.trim();
      debug!(key = %key, value = %value, "applying override");

      match key {
        | "data.location" => {
          self.data.location =
            value.to_string();
        }
        | "view.category" => {
          self.view.category =
            value.to_string();
        }
        | "view.sort" => {
          self.view.sort =
            value.to_string();
        }
        | "view.color" => {
          self.view.color =
            parse_bool(value);
        }
        | "calendar.timezone" => {
          self.calendar.timezone =
            Some(value.to_string());
        }
        | "calendar.year" => {
          match value.parse::<i32>() {
            | Ok(year) => {
              self.calendar.year =
                Some(year);
            }
            | Err(err) => {
              warn!(value = %value, error = %err, "ignoring invalid calendar.year override");
            }
          }
        }
        | other => {
          warn!(key = %other, "ignoring unknown config key");
        }
      }
    }
  }

  /// Configured default category; an
  /// unknown value falls back to the
  /// built-in default.
  #[must_use]
  pub fn category(&self) -> Category {
    Category::from_str(
      self.view.category.trim(),
      true
    )
    .unwrap_or_else(|_| {
      warn!(
        category = %self.view.category,
        "unknown category in config; \
         using default"
      );
      Category::AnnualSeed
    })
  }

  #[must_use]
  pub fn sort_order(&self) -> SortOrder {
    SortOrder::from_str(
      self.view.sort.trim(),
      true
    )
    .unwrap_or_else(|_| {
      warn!(
        sort = %self.view.sort,
        "unknown sort order in config; \
         using default"
      );
      SortOrder::default()
    })
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> PathBuf {
  override_dir
    .map(Path::to_path_buf)
    .unwrap_or_else(|| {
      expand_tilde(Path::new(
        &cfg.data.location
      ))
    })
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed == "/dev/null" {
      return None;
    }
    if !trimmed.is_empty() {
      return Some(expand_tilde(
        Path::new(trimmed)
      ));
    }
  }

  let candidate = dirs::config_dir()?
    .join(CONFIG_DIR_NAME)
    .join(CONFIG_FILE_NAME);
  candidate.exists().then_some(candidate)
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
