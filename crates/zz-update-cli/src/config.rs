use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use zz_update::commit::Tools;
use zz_update::{Classifier, Layout};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigKeys {
    pub ignored: Option<Vec<String>>,
    pub impossible: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayout {
    pub clients: Option<PathBuf>,
    pub activities: Option<PathBuf>,
    pub activity_prefix: Option<String>,
    pub ledger_dirs: Option<Vec<String>>,
    pub ledger_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "RawConfigTools")]
pub struct ConfigTools {
    pub vcs: Option<Vec<String>>,
    pub editor: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfigTools {
    vcs: Option<Vec<String>>,
    editor: Option<Vec<String>>,
}

impl TryFrom<RawConfigTools> for ConfigTools {
    type Error = String;

    fn try_from(raw: RawConfigTools) -> Result<Self, Self::Error> {
        for (name, command) in [("vcs", &raw.vcs), ("editor", &raw.editor)] {
            if command.as_ref().is_some_and(Vec::is_empty) {
                return Err(format!("tools.{name} must name a program"));
            }
        }
        Ok(ConfigTools {
            vcs: raw.vcs,
            editor: raw.editor,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The getan database.
    pub database: Option<PathBuf>,
    pub care_keyword: Option<String>,
    #[serde(default)]
    pub keys: ConfigKeys,
    #[serde(default)]
    pub layout: ConfigLayout,
    #[serde(default)]
    pub tools: ConfigTools,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<(PathBuf, Self)> {
        let base_dir = path.parent().map(ToOwned::to_owned).unwrap_or_default();

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok((base_dir, config))
    }

    pub fn find_and_load() -> Result<Option<(PathBuf, Self)>> {
        let mut config_locations = vec![
            PathBuf::from("zz-update.toml"),
            PathBuf::from(".zz-update.toml"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            config_locations.push(config_dir.join("zz-update").join("config.toml"));
        }

        for location in &config_locations {
            if location.exists() {
                tracing::debug!("Using config file {}", location.display());
                return Self::load_from_file(location).map(Some);
            }
        }

        Ok(None)
    }

    pub fn database(&self, base_dir: &Path) -> Result<PathBuf> {
        match &self.database {
            Some(path) => resolve_path(base_dir, path),
            None => {
                let home = dirs::home_dir().context("Cannot determine home directory")?;
                Ok(home.join(".getan").join("time.db"))
            }
        }
    }

    pub fn classifier(&self) -> Classifier {
        let default = Classifier::default();
        Classifier {
            ignored_keys: match &self.keys.ignored {
                Some(keys) => keys.iter().cloned().collect(),
                None => default.ignored_keys,
            },
            impossible_keys: match &self.keys.impossible {
                Some(keys) => keys.iter().cloned().collect(),
                None => default.impossible_keys,
            },
            care_keyword: self.care_keyword.clone().unwrap_or(default.care_keyword),
        }
    }

    pub fn layout(&self, base_dir: &Path) -> Result<Layout> {
        let default = Layout::default();
        let layout = &self.layout;
        Ok(Layout {
            clients: match &layout.clients {
                Some(path) => resolve_path(base_dir, path)?,
                None => default.clients,
            },
            activities: match &layout.activities {
                Some(path) => resolve_path(base_dir, path)?,
                None => default.activities,
            },
            activity_prefix: layout
                .activity_prefix
                .clone()
                .unwrap_or(default.activity_prefix),
            ledger_dirs: layout.ledger_dirs.clone().unwrap_or(default.ledger_dirs),
            ledger_name: layout.ledger_name.clone().unwrap_or(default.ledger_name),
        })
    }

    pub fn tools(&self) -> Tools {
        let default = Tools::default();
        Tools {
            vcs: self.tools.vcs.clone().unwrap_or(default.vcs),
            editor: self.tools.editor.clone().unwrap_or(default.editor),
        }
    }
}

/// Expand a leading `~/` and make relative paths relative to the config file.
pub fn resolve_path(base_dir: &Path, path: &Path) -> Result<PathBuf> {
    if let Ok(rest) = path.strip_prefix("~") {
        let home = dirs::home_dir().context("Cannot determine home directory")?;
        return Ok(home.join(rest));
    }
    Ok(base_dir.join(path))
}
