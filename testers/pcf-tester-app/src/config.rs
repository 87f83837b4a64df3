//! Command line and config file
//!
//! Precedence: CLI flags, then `pcf-tester.toml` (or `--config`), then
//! built-in defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use pcf_tester::{FileModeStore, MemoryModeStore, ModeStore, MODE_KEY};
use serde::Deserialize;

use crate::sim_host::{Fixture, SimHost};

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "pcf-tester.toml";

/// How the control is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Full-screen terminal UI
    #[default]
    Tui,
    /// Line-oriented: commands from stdin, the whole log reprinted on change
    Plain,
}

/// PCF tester - lifecycle and host diagnostics for a simulated host
#[derive(Parser, Debug, Default)]
#[command(name = "pcf-tester")]
#[command(about = "Drive a diagnostic tester control against a simulated host")]
pub struct Args {
    /// Config file (TOML)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// File the test mode is persisted in
    #[arg(long)]
    pub mode_file: Option<PathBuf>,

    /// Run with this mode without reading or writing the mode file
    #[arg(long, short)]
    pub mode: Option<String>,

    /// Dataset fixture (JSON) bound to the control
    #[arg(long, short)]
    pub dataset: Option<PathBuf>,

    /// Page size of the bound dataset, overriding the fixture
    #[arg(long)]
    pub page_size: Option<u32>,

    #[arg(long, value_enum)]
    pub view: Option<ViewKind>,

    /// Seed for `Event Value` rolls
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where tracing output goes
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Host parameter, repeatable: `--param formHeight=80`
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

/// Contents of the config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub mode_file: Option<PathBuf>,
    pub dataset: Option<PathBuf>,
    pub page_size: Option<u32>,
    pub view: Option<ViewKind>,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub parameters: BTreeMap<String, String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Where the mode lives for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeSource {
    /// Fixed for the run, never written back
    Fixed(String),
    File(PathBuf),
}

/// Resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: ModeSource,
    pub dataset: Option<PathBuf>,
    pub page_size: Option<u32>,
    pub view: ViewKind,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
    pub parameters: BTreeMap<String, String>,
}

impl Settings {
    /// Merge CLI args over the config file. An explicit `--config` must
    /// exist; the default file is optional.
    pub fn load(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                if !path.exists() {
                    bail!("config file {} does not exist", path.display());
                }
                FileConfig::load(path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                FileConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => FileConfig::default(),
        };
        Ok(Self::merge(args, file))
    }

    pub fn merge(args: Args, file: FileConfig) -> Self {
        let mode = match args.mode {
            Some(mode) => ModeSource::Fixed(mode),
            None => ModeSource::File(
                args.mode_file
                    .or(file.mode_file)
                    .unwrap_or_else(default_mode_file),
            ),
        };

        let mut parameters = file.parameters;
        parameters.extend(args.params);

        Self {
            mode,
            dataset: args.dataset.or(file.dataset),
            page_size: args.page_size.or(file.page_size),
            view: args.view.or(file.view).unwrap_or_default(),
            seed: args.seed.or(file.seed),
            log_file: args
                .log_file
                .or(file.log_file)
                .unwrap_or_else(|| PathBuf::from("pcf-tester.log")),
            parameters,
        }
    }

    pub fn mode_store(&self) -> Box<dyn ModeStore> {
        match &self.mode {
            ModeSource::Fixed(mode) => Box::new(MemoryModeStore::with_mode(mode.clone())),
            ModeSource::File(path) => Box::new(FileModeStore::new(path.clone())),
        }
    }

    /// Host with the configured dataset and parameters.
    pub fn host(&self) -> Result<SimHost> {
        let mut fixture = match &self.dataset {
            Some(path) => Fixture::load(path)?,
            None => Fixture::default(),
        };
        if let Some(size) = self.page_size {
            fixture.page_size = Some(size);
        }
        fixture.parameters.extend(self.parameters.clone());
        Ok(SimHost::from_fixture(fixture))
    }
}

/// `<local data dir>/pcf-tester/mode.json`, or a dotfile in the working
/// directory when the platform has no data dir.
pub fn default_mode_file() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("pcf-tester").join("mode.json"),
        None => PathBuf::from(format!(".{MODE_KEY}.json")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_overrides_file() {
        let args = Args::parse_from([
            "pcf-tester",
            "--view",
            "plain",
            "--seed",
            "9",
            "--param",
            "formHeight=80",
        ]);
        let file: FileConfig = toml::from_str(
            r#"
            view = "tui"
            seed = 1
            page_size = 4

            [parameters]
            formHeight = "10"
            bound_1 = "x"
            "#,
        )
        .unwrap();

        let settings = Settings::merge(args, file);
        assert_eq!(settings.view, ViewKind::Plain);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.page_size, Some(4));
        assert_eq!(settings.parameters["formHeight"], "80");
        assert_eq!(settings.parameters["bound_1"], "x");
    }

    #[test]
    fn test_fixed_mode_skips_file() {
        let args = Args::parse_from(["pcf-tester", "--mode", "size,updates"]);
        let settings = Settings::merge(args, FileConfig::default());
        assert_eq!(settings.mode, ModeSource::Fixed("size,updates".into()));
        assert_eq!(settings.mode_store().get_mode(), "size,updates");
    }

    #[test]
    fn test_mode_file_from_config() {
        let args = Args::parse_from(["pcf-tester"]);
        let file = FileConfig {
            mode_file: Some(PathBuf::from("/tmp/m.json")),
            ..Default::default()
        };
        let settings = Settings::merge(args, file);
        assert_eq!(settings.mode, ModeSource::File(PathBuf::from("/tmp/m.json")));
    }

    #[test]
    fn test_bad_param_rejected() {
        assert!(Args::try_parse_from(["pcf-tester", "--param", "novalue"]).is_err());
        assert_eq!(parse_param("a=b=c"), Ok(("a".into(), "b=c".into())));
    }

    #[test]
    fn test_unknown_config_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pcf-tester.toml");
        fs::write(&path, "colour = \"red\"\n").unwrap();
        assert!(FileConfig::load(&path).is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let args = Args {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Default::default()
        };
        assert!(Settings::load(args).is_err());
    }
}
