//! Layered client configuration.
//!
//! Precedence, lowest first:
//! 1. built-in defaults ([`ClientConfig::default`])
//! 2. a TOML file, if present (`~/.config/peach/config.toml` unless overridden)
//! 3. `PEACH_*` environment variables, e.g. `PEACH_BASE_URL`, `PEACH_AUTO_INIT`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use peach_application::ClientConfig;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "PEACH";

/// Builds a [`ClientConfig`] from file and environment layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Creates a loader reading the default file and the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration file location.
    #[must_use]
    pub fn default_file() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("peach").join("config.toml"))
    }

    /// Reads the given file instead of the default one.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads overrides from the given variables instead of the process
    /// environment.
    #[must_use]
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Resolves the configuration.
    ///
    /// A missing file is skipped; a malformed one is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer cannot be parsed or a value has the
    /// wrong type.
    pub fn load(&self) -> Result<ClientConfig, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = self.file.clone().or_else(Self::default_file) {
            tracing::debug!(path = %path.display(), "reading client configuration");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let env = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(self.env.clone().map(|vars| vars.into_iter().collect()));

        builder.add_source(env).build()?.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_layers() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .with_file(dir.path().join("missing.toml"))
            .with_env(HashMap::new())
            .load()
            .unwrap();

        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_file_then_env_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"https://v1.peachapi.com\"\nnamespace = \"work\"\ntimeout_ms = 5000\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(&path)
            .with_env(vars(&[("PEACH_NAMESPACE", "home"), ("PEACH_AUTO_INIT", "false")]))
            .load()
            .unwrap();

        assert_eq!(config.base_url, "https://v1.peachapi.com");
        assert_eq!(config.namespace, "home");
        assert_eq!(config.timeout_ms, 5000);
        assert!(!config.auto_init);
        assert_eq!(config.init_delay_ms, 1);
    }

    #[test]
    fn test_origin_from_env() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .with_file(dir.path().join("missing.toml"))
            .with_env(vars(&[("PEACH_ORIGIN", "https://v1.peachapi.com")]))
            .load()
            .unwrap();

        assert_eq!(
            config.origin.map(|u| u.to_string()),
            Some("https://v1.peachapi.com/".to_string())
        );
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_ms = [").unwrap();

        let result = ConfigLoader::new()
            .with_file(&path)
            .with_env(HashMap::new())
            .load();

        assert!(result.is_err());
    }
}
