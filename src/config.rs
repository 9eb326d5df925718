//! Generator configuration
//!
//! Settings come from an optional YAML file (`flowgen.yaml`) and are then
//! overridden by command line flags. Values still missing fall back to the
//! design (`schemes`, `host`) and finally to built-in defaults.

use crate::error::{Error, Result};
use crate::jsgen::RenderConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file name looked up in the working directory
pub const CONFIG_FILE: &str = "flowgen.yaml";

/// Generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratorConfig {
    /// Directory the `js/` folder is written to
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Request timeout of the generated client, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Scheme used by the generated client (defaults to the first design
    /// scheme, then `http`)
    #[serde(default)]
    pub scheme: Option<String>,

    /// Host addressed by the generated client (defaults to the design host)
    #[serde(default)]
    pub host: Option<String>,

    /// Generator version the design requires
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub render: RenderConfig,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            timeout_secs: default_timeout_secs(),
            scheme: None,
            host: None,
            version: None,
            render: RenderConfig::default(),
        }
    }
}

/// Command line overrides; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub out_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub version: Option<String>,
    pub provenance: Option<bool>,
}

impl GeneratorConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_norway::from_str(&content).map_err(|e| {
            Error::Other(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load `flowgen.yaml` from a directory, or the defaults when absent
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command line overrides
    pub fn merge(mut self, overrides: &Overrides) -> Self {
        if let Some(out_dir) = &overrides.out_dir {
            self.out_dir = out_dir.clone();
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = secs;
        }
        if overrides.scheme.is_some() {
            self.scheme = overrides.scheme.clone();
        }
        if overrides.host.is_some() {
            self.host = overrides.host.clone();
        }
        if overrides.version.is_some() {
            self.version = overrides.version.clone();
        }
        if let Some(provenance) = overrides.provenance {
            self.render.provenance = provenance;
        }
        self
    }

    /// Client timeout; zero means the default
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(default_timeout_secs()),
            secs => Duration::from_secs(secs),
        }
    }
}

/// Check that a design written for generator version `requested` can be
/// handled by this build. Versions are compatible when their major numbers
/// match.
pub fn check_version(requested: &str) -> Result<()> {
    let requested = requested.trim().trim_start_matches('v');
    if requested.is_empty() {
        return Ok(());
    }
    let current = env!("CARGO_PKG_VERSION");
    let major = |v: &str| v.split('.').next().unwrap_or_default().to_string();
    if major(requested) != major(current) {
        return Err(Error::VersionMismatch {
            requested: requested.to_string(),
            current: current.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.out_dir, PathBuf::from("."));
        assert_eq!(config.render.indent, "  ");
    }

    #[test]
    fn test_parse_partial_file() {
        let config: GeneratorConfig = serde_norway::from_str(
            r#"
host: api.example.com
render:
  optional_fields: true
"#,
        )
        .unwrap();
        assert_eq!(config.host.as_deref(), Some("api.example.com"));
        assert!(config.render.optional_fields);
        assert_eq!(config.render.indent, "  ");
        assert_eq!(config.timeout_secs, 20);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            GeneratorConfig::load_from_dir(dir.path()).unwrap(),
            GeneratorConfig::default()
        );
        std::fs::write(dir.path().join(CONFIG_FILE), "timeout_secs: 5\n").unwrap();
        let config = GeneratorConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_overrides_win() {
        let config = GeneratorConfig {
            host: Some("from-file".into()),
            ..GeneratorConfig::default()
        }
        .merge(&Overrides {
            host: Some("from-flag".into()),
            timeout_secs: Some(0),
            provenance: Some(true),
            ..Overrides::default()
        });
        assert_eq!(config.host.as_deref(), Some("from-flag"));
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert!(config.render.provenance);
    }

    #[test]
    fn test_check_version() {
        assert!(check_version("").is_ok());
        assert!(check_version(env!("CARGO_PKG_VERSION")).is_ok());
        assert!(matches!(
            check_version("99.0.0"),
            Err(Error::VersionMismatch { .. })
        ));
    }
}
