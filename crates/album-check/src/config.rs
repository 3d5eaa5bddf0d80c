//! Configuration file discovery and layering
//!
//! Searches for `.config/album-check.yaml` walking up from the current
//! directory. The project root is the parent of `.config/`. Values from the
//! command line and environment take precedence over the file.

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, WrapErr, eyre};
use serde::Deserialize;
use std::env;
use std::time::Duration;

const CONFIG_DIR: &str = ".config";
const CONFIG_FILE: &str = "album-check.yaml";

/// Output directory used when nothing else is configured
const DEFAULT_OUTPUT: &str = "public";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Contents of `.config/album-check.yaml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlbumCheckConfig {
    /// Output tree of the site generator (relative to project root)
    #[serde(default)]
    pub output: Option<Utf8PathBuf>,

    /// Fixture table to use instead of the built-in one
    #[serde(default)]
    pub fixtures: Option<Utf8PathBuf>,

    /// Per-check timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Maximum number of checks in flight
    #[serde(default)]
    pub jobs: Option<usize>,
}

/// Settings given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output: Option<Utf8PathBuf>,
    pub fixtures: Option<Utf8PathBuf>,
    pub timeout: Option<Duration>,
    pub jobs: Option<usize>,
}

/// Configuration with every path resolved
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Root of the generated output tree
    pub output_dir: Utf8PathBuf,
    /// Fixture table file, or `None` for the built-in table
    pub fixtures: Option<Utf8PathBuf>,
    pub timeout: Duration,
    pub jobs: usize,
}

impl ResolvedConfig {
    /// Discover the config file from the current directory and apply overrides
    pub fn discover(overrides: Overrides) -> Result<Self> {
        let cwd = current_dir()?;
        match find_config_file(&cwd) {
            Some(path) => {
                tracing::info!("Using configuration from {path}");
                let config = load_config(&path)?;
                let root = project_root(&path)?;
                Ok(Self::resolve(config, root, overrides))
            }
            None => Ok(Self::resolve(AlbumCheckConfig::default(), &cwd, overrides)),
        }
    }

    /// Combine a parsed config file with overrides; relative paths from the
    /// file are anchored at `root`, overrides are taken as given
    pub fn resolve(config: AlbumCheckConfig, root: &Utf8Path, overrides: Overrides) -> Self {
        let output_dir = overrides.output.unwrap_or_else(|| {
            root.join(config.output.as_deref().unwrap_or(Utf8Path::new(DEFAULT_OUTPUT)))
        });

        let fixtures = overrides
            .fixtures
            .or_else(|| config.fixtures.map(|f| root.join(f)));

        let timeout = overrides
            .timeout
            .or(config.timeout_secs.map(Duration::from_secs))
            .unwrap_or(DEFAULT_TIMEOUT);

        let jobs = overrides
            .jobs
            .or(config.jobs)
            .unwrap_or_else(default_jobs)
            .max(1);

        Self {
            output_dir,
            fixtures,
            timeout,
            jobs,
        }
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| {
        eyre!(
            "Current directory is not valid UTF-8: {}",
            e.as_path().display()
        )
    })
}

/// Search for `.config/album-check.yaml` walking up from `start`
fn find_config_file(start: &Utf8Path) -> Option<Utf8PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

fn project_root(config_path: &Utf8Path) -> Result<&Utf8Path> {
    config_path
        .parent()
        .and_then(Utf8Path::parent)
        .ok_or_else(|| eyre!("{config_path} is not inside a .config directory"))
}

fn load_config(config_path: &Utf8Path) -> Result<AlbumCheckConfig> {
    let content = fs_err::read_to_string(config_path)?;
    serde_yaml::from_str(&content).wrap_err_with(|| format!("Failed to parse {config_path}"))
}
