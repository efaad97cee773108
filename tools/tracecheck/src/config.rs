use crate::errors::TracecheckError;
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub traces: Option<PathBuf>,
    pub driver: Option<PathBuf>,
    pub candidate: Option<PathBuf>,
    pub reference: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub harness: HarnessConfig,
    pub traces: TracesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarnessConfig {
    pub driver: PathBuf,
    pub candidate: PathBuf,
    pub reference: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            driver: PathBuf::from("./sdriver.pl"),
            candidate: PathBuf::from("./tsh"),
            reference: PathBuf::from("./tshref"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TracesConfig {
    pub root: PathBuf,
}

impl Default for TracesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Load configuration: explicit `--config` must exist and parse; otherwise
/// defaults apply. CLI overrides win over file values, and relative paths
/// are resolved against the invocation working directory.
pub fn load_config(
    overrides: &CliOverrides,
    cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<AppConfig, TracecheckError> {
    let mut config = match &overrides.config_path {
        Some(path) => {
            let text = fs.read_to_string(path)?;
            toml::from_str::<AppConfig>(&text)
                .map_err(|e| TracecheckError::ConfigParse(e.to_string()))?
        }
        None => AppConfig::default(),
    };

    if let Some(traces) = &overrides.traces {
        config.traces.root = traces.clone();
    }
    if let Some(driver) = &overrides.driver {
        config.harness.driver = driver.clone();
    }
    if let Some(candidate) = &overrides.candidate {
        config.harness.candidate = candidate.clone();
    }
    if let Some(reference) = &overrides.reference {
        config.harness.reference = reference.clone();
    }

    config.traces.root = resolve_against(cwd, &config.traces.root);
    config.harness.driver = resolve_against(cwd, &config.harness.driver);
    config.harness.candidate = resolve_against(cwd, &config.harness.candidate);
    config.harness.reference = resolve_against(cwd, &config.harness.reference);

    Ok(config)
}

fn resolve_against(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
